//! LendBank CLI - Main entry point

use clap::{Parser, Subcommand};
use lendbank_core::Asset;
use lendbank_lending::LendingConfig;
use lendbank_rpc::{commands, AppContext};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info_span, Instrument};

#[derive(Parser)]
#[command(name = "lendbank")]
#[command(about = "LendBank - Collateralized lending ledger", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON Lines script against a fresh ledger
    Run {
        /// Script path
        script: PathBuf,
        /// Write the event journal here after the run
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Print the effective configuration
    Params,

    /// List supported assets
    Assets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries results
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { script, events } => {
            let ctx = AppContext::from_config_path(cli.config.as_deref())?;
            let span = info_span!("run", run_id = %ctx.run_id());

            let reader = BufReader::new(File::open(&script)?);
            let reports = commands::run_script(&ctx, reader)
                .instrument(span)
                .await?;

            for report in &reports {
                println!("{}", serde_json::to_string(report)?);
            }

            let failed = reports.iter().filter(|r| !r.is_ok()).count();
            eprintln!(
                "✅ {} steps, {} failed (final height {})",
                reports.len(),
                failed,
                ctx.height()
            );

            if let Some(path) = events {
                let written = ctx.export_events(&path).await?;
                eprintln!("📝 Wrote {} events to {}", written, path.display());
            }
        }

        Commands::Params => {
            let config = match &cli.config {
                Some(path) => LendingConfig::from_file(path)?,
                None => LendingConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Assets => {
            for asset in Asset::SUPPORTED {
                println!("{}", asset);
            }
        }
    }

    Ok(())
}
