//! Script commands
//!
//! A script is JSON Lines. Each line names the caller, an optional block
//! height and one operation:
//!
//! ```text
//! {"caller":"ADMIN","op":"initialize"}
//! {"caller":"ADMIN","op":"set_price","asset":"BTC","price":50000}
//! {"caller":"alice","height":10,"op":"request_loan","collateral":1,"amount":300}
//! ```
//!
//! A failing line is reported and the run goes on.

use lendbank_core::{Asset, LoanId, Principal, PrincipalError};
use lendbank_lending::{ErrorKind, LendingError, LoanStatus};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::BufRead;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::AppContext;

/// One line of a script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptLine {
    pub caller: String,
    /// Move the clock here before running the command
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(flatten)]
    pub command: Command,
}

/// Operations a script can invoke
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Initialize,
    DepositCollateral { amount: u64 },
    RequestLoan { collateral: u64, amount: u64 },
    RepayLoan { loan_id: u64, amount: u64 },
    CheckLiquidation { loan_id: u64 },
    SweepLiquidations,
    SetMinimumRatio { value: u32 },
    SetLiquidationThreshold { value: u32 },
    SetFeeRate { value: u32 },
    SetPrice { asset: String, price: u64 },
    GetLoan { loan_id: u64 },
    GetPortfolio { borrower: String },
    GetStats,
    GetSupportedAssets,
    GetParameters,
    GetPrice { asset: String },
    GetPrices,
    GetEvents {
        /// Only events with a greater sequence number
        #[serde(default)]
        since: u64,
    },
    RepaymentQuote { loan_id: u64 },
    LoanHealth { loan_id: u64 },
    LoansByStatus { status: LoanStatus },
    LiquidatableLoans,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialize => "initialize",
            Command::DepositCollateral { .. } => "deposit_collateral",
            Command::RequestLoan { .. } => "request_loan",
            Command::RepayLoan { .. } => "repay_loan",
            Command::CheckLiquidation { .. } => "check_liquidation",
            Command::SweepLiquidations => "sweep_liquidations",
            Command::SetMinimumRatio { .. } => "set_minimum_ratio",
            Command::SetLiquidationThreshold { .. } => "set_liquidation_threshold",
            Command::SetFeeRate { .. } => "set_fee_rate",
            Command::SetPrice { .. } => "set_price",
            Command::GetLoan { .. } => "get_loan",
            Command::GetPortfolio { .. } => "get_portfolio",
            Command::GetStats => "get_stats",
            Command::GetSupportedAssets => "get_supported_assets",
            Command::GetParameters => "get_parameters",
            Command::GetPrice { .. } => "get_price",
            Command::GetPrices => "get_prices",
            Command::GetEvents { .. } => "get_events",
            Command::RepaymentQuote { .. } => "repayment_quote",
            Command::LoanHealth { .. } => "loan_health",
            Command::LoansByStatus { .. } => "loans_by_status",
            Command::LiquidatableLoans => "liquidatable_loans",
        }
    }
}

/// Errors while running a command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed command: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid caller: {0}")]
    InvalidCaller(#[from] PrincipalError),

    #[error(transparent)]
    Lending(#[from] LendingError),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Json(_) | CommandError::InvalidCaller(_) => ErrorKind::Validation,
            CommandError::Lending(e) => e.kind(),
        }
    }
}

/// What happened on one script line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// 1-based line number in the script
    pub line: usize,
    pub op: Option<&'static str>,
    /// Clock height after the line ran
    pub height: u64,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Ok { output: Value },
    Failed { kind: ErrorKind, error: String },
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, StepOutcome::Ok { .. })
    }
}

/// Run one parsed line against the engine
pub async fn execute(ctx: &AppContext, line: ScriptLine) -> Result<Value, CommandError> {
    let caller = Principal::new(line.caller)?;
    if let Some(height) = line.height {
        ctx.advance_to(height);
    }

    let output = match line.command {
        // === Lending ===
        Command::Initialize => {
            ctx.engine.write().await.initialize(&caller)?;
            json!({ "initialized": true })
        }
        Command::DepositCollateral { amount } => {
            let mut engine = ctx.engine.write().await;
            engine.deposit_collateral(&caller, amount)?;
            serde_json::to_value(engine.get_aggregate_stats())?
        }
        Command::RequestLoan { collateral, amount } => {
            let loan_id = ctx
                .engine
                .write()
                .await
                .request_loan(&caller, collateral, amount)?;
            json!({ "loan_id": loan_id })
        }
        Command::RepayLoan { loan_id, amount } => {
            let settlement = ctx
                .engine
                .write()
                .await
                .repay_loan(&caller, LoanId(loan_id), amount)?;
            serde_json::to_value(settlement)?
        }
        Command::CheckLiquidation { loan_id } => {
            let outcome = ctx
                .engine
                .write()
                .await
                .check_liquidation(&caller, LoanId(loan_id))?;
            serde_json::to_value(outcome)?
        }
        Command::SweepLiquidations => {
            let liquidated = ctx.engine.write().await.sweep_liquidations(&caller)?;
            json!({ "liquidated": liquidated })
        }

        // === Governance ===
        Command::SetMinimumRatio { value } => {
            ctx.engine.write().await.set_minimum_ratio(&caller, value)?;
            json!({ "minimum_collateral_ratio": value })
        }
        Command::SetLiquidationThreshold { value } => {
            ctx.engine
                .write()
                .await
                .set_liquidation_threshold(&caller, value)?;
            json!({ "liquidation_threshold": value })
        }
        Command::SetFeeRate { value } => {
            ctx.engine.write().await.set_fee_rate(&caller, value)?;
            json!({ "fee_rate": value })
        }
        Command::SetPrice { asset, price } => {
            let quote = ctx.engine.write().await.set_price(&caller, &asset, price)?;
            serde_json::to_value(quote)?
        }

        // === Queries ===
        Command::GetLoan { loan_id } => {
            serde_json::to_value(ctx.engine.read().await.get_loan(LoanId(loan_id)))?
        }
        Command::GetPortfolio { borrower } => {
            let borrower = Principal::new(borrower)?;
            serde_json::to_value(ctx.engine.read().await.get_borrower_portfolio(&borrower))?
        }
        Command::GetStats => serde_json::to_value(ctx.engine.read().await.get_aggregate_stats())?,
        Command::GetSupportedAssets => {
            serde_json::to_value(ctx.engine.read().await.get_supported_assets())?
        }
        Command::GetParameters => serde_json::to_value(ctx.engine.read().await.get_parameters())?,
        Command::GetPrice { asset } => {
            let asset: Asset = asset.parse().map_err(LendingError::from)?;
            serde_json::to_value(ctx.engine.read().await.get_price(asset))?
        }
        Command::GetPrices => serde_json::to_value(ctx.engine.read().await.get_prices())?,
        Command::GetEvents { since } => {
            serde_json::to_value(ctx.engine.read().await.events().since(since))?
        }
        Command::RepaymentQuote { loan_id } => {
            serde_json::to_value(ctx.engine.read().await.repayment_quote(LoanId(loan_id)))?
        }
        Command::LoanHealth { loan_id } => {
            serde_json::to_value(ctx.engine.read().await.loan_health(LoanId(loan_id)))?
        }
        Command::LoansByStatus { status } => {
            serde_json::to_value(ctx.engine.read().await.loans_by_status(status))?
        }
        Command::LiquidatableLoans => {
            serde_json::to_value(ctx.engine.read().await.liquidatable_loans())?
        }
    };

    Ok(output)
}

/// Run every line of a script in order
///
/// Blank lines are skipped. Returns one report per executed line; only I/O
/// errors on the reader abort the run.
pub async fn run_script<R: BufRead>(
    ctx: &AppContext,
    reader: R,
) -> Result<Vec<StepReport>, anyhow::Error> {
    let mut reports = Vec::new();

    for (index, text) in reader.lines().enumerate() {
        let text = text?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let line = index + 1;

        let (op, result) = match serde_json::from_str::<ScriptLine>(text) {
            Ok(parsed) => {
                let op = parsed.command.name();
                debug!(line, op, caller = %parsed.caller, "executing");
                (Some(op), execute(ctx, parsed).await)
            }
            Err(e) => (None, Err(CommandError::from(e))),
        };

        let outcome = match result {
            Ok(output) => StepOutcome::Ok { output },
            Err(e) => {
                warn!(line, op, kind = %e.kind(), error = %e, "command failed");
                StepOutcome::Failed {
                    kind: e.kind(),
                    error: e.to_string(),
                }
            }
        };

        reports.push(StepReport {
            line,
            op,
            height: ctx.height(),
            outcome,
        });
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    info!(steps = reports.len(), failed, "script finished");
    Ok(reports)
}
