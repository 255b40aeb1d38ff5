//! LendBank RPC - Script runner and CLI orchestrator
//!
//! This crate provides the CLI binary and command orchestration.

pub mod commands;
pub mod context;

pub use commands::{execute, run_script, Command, CommandError, ScriptLine, StepOutcome, StepReport};
pub use context::AppContext;
