//! Application context - wires the engine to a clock and a lock

use lendbank_lending::{LendingConfig, LendingEngine, ManualClock, TimeSource};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Application context - one engine per run
///
/// Mutating commands take the write lock for the whole operation; queries
/// share the read lock.
pub struct AppContext {
    pub engine: Arc<RwLock<LendingEngine>>,
    pub clock: Arc<ManualClock>,
    run_id: Uuid,
}

impl AppContext {
    /// Create a new application context at height 0
    pub fn new(config: LendingConfig) -> Result<Self, anyhow::Error> {
        let clock = Arc::new(ManualClock::new(0));
        let engine = LendingEngine::new(config, clock.clone())?;
        let run_id = Uuid::new_v4();

        info!(%run_id, admin = %engine.admin(), "lending engine ready");

        Ok(Self {
            engine: Arc::new(RwLock::new(engine)),
            clock,
            run_id,
        })
    }

    /// Load configuration from `path` if given, defaults otherwise
    pub fn from_config_path(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let config = match path {
            Some(path) => LendingConfig::from_file(path)?,
            None => LendingConfig::default(),
        };
        Self::new(config)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Current logical height
    pub fn height(&self) -> u64 {
        self.clock.current_height()
    }

    /// Move the clock forward to `height`; earlier heights are ignored
    pub fn advance_to(&self, height: u64) -> u64 {
        let now = self.clock.set(height);
        if now != height {
            warn!(requested = height, current = now, "height is in the past, clock unchanged");
        }
        now
    }

    /// Write the event journal to `path` as JSON Lines
    ///
    /// Returns the number of records written.
    pub async fn export_events(&self, path: &Path) -> Result<usize, anyhow::Error> {
        let engine = self.engine.read().await;
        let file = File::create(path)?;
        engine.events().write_jsonl(BufWriter::new(file))?;

        let written = engine.events().len();
        info!(path = %path.display(), written, "event journal exported");
        Ok(written)
    }
}
