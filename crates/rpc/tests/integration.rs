//! Integration tests for LendBank
//!
//! These tests drive the engine through the script runner, the same path
//! the CLI takes.

use lendbank_core::{LoanId, Principal};
use lendbank_lending::{ErrorKind, LendingConfig, LoanStatus, TimeSource};
use lendbank_rpc::{commands, AppContext, StepOutcome, StepReport};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

async fn run(ctx: &AppContext, script: &str) -> Vec<StepReport> {
    commands::run_script(ctx, Cursor::new(script.to_string()))
        .await
        .unwrap()
}

fn output(report: &StepReport) -> &Value {
    match &report.outcome {
        StepOutcome::Ok { output } => output,
        StepOutcome::Failed { error, .. } => panic!("line {} failed: {}", report.line, error),
    }
}

fn failure_kind(report: &StepReport) -> ErrorKind {
    match &report.outcome {
        StepOutcome::Failed { kind, .. } => *kind,
        StepOutcome::Ok { output } => panic!("line {} succeeded: {}", report.line, output),
    }
}

const SETUP: &str = r#"
{"caller":"ADMIN","op":"initialize"}
{"caller":"ADMIN","op":"set_price","asset":"BTC","price":50000}
"#;

/// Test: Scenario A then D - originate, accrue one day, repay
#[tokio::test]
async fn test_originate_and_repay() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();
    run(&ctx, SETUP).await;

    let reports = run(
        &ctx,
        r#"{"caller":"alice","height":10,"op":"request_loan","collateral":1,"amount":300}
{"caller":"alice","height":154,"op":"repayment_quote","loan_id":1}
{"caller":"alice","op":"repay_loan","loan_id":1,"amount":314}
{"caller":"alice","op":"repay_loan","loan_id":1,"amount":315}
{"caller":"alice","op":"get_loan","loan_id":1}"#,
    )
    .await;

    assert_eq!(output(&reports[0]), &json!({ "loan_id": 1 }));
    assert_eq!(reports[0].height, 10);

    let quote = output(&reports[1]);
    assert_eq!(quote["elapsed"], 144);
    assert_eq!(quote["interest"], 15);
    assert_eq!(quote["total_owed"], 315);

    assert_eq!(failure_kind(&reports[2]), ErrorKind::Validation);

    let settlement = output(&reports[3]);
    assert_eq!(settlement["total_owed"], 315);
    assert_eq!(settlement["paid"], 315);

    assert_eq!(output(&reports[4])["status"], "repaid");

    let engine = ctx.engine.read().await;
    assert_eq!(engine.get_aggregate_stats().total_loans_issued, 1);
    assert_eq!(
        engine.get_loan(LoanId(1)).unwrap().status,
        LoanStatus::Repaid
    );
}

/// Test: Scenario B - undercollateralized request changes nothing
#[tokio::test]
async fn test_insufficient_collateral() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();
    run(&ctx, SETUP).await;

    let reports = run(
        &ctx,
        r#"{"caller":"alice","op":"request_loan","collateral":1,"amount":400}
{"caller":"alice","op":"get_stats"}"#,
    )
    .await;

    assert_eq!(failure_kind(&reports[0]), ErrorKind::Validation);
    assert_eq!(output(&reports[1])["total_loans_issued"], 0);
}

/// Test: Scenario C - price drop, liquidation, whole portfolio cleared
#[tokio::test]
async fn test_price_drop_liquidation() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();
    run(&ctx, SETUP).await;

    let reports = run(
        &ctx,
        r#"{"caller":"alice","op":"request_loan","collateral":1,"amount":300}
{"caller":"alice","op":"request_loan","collateral":10,"amount":300}
{"caller":"ADMIN","op":"set_price","asset":"BTC","price":350}
{"caller":"keeper","op":"liquidatable_loans"}
{"caller":"keeper","op":"check_liquidation","loan_id":1}
{"caller":"keeper","op":"check_liquidation","loan_id":1}
{"caller":"keeper","op":"get_portfolio","borrower":"alice"}
{"caller":"keeper","op":"loans_by_status","status":"active"}"#,
    )
    .await;

    assert_eq!(output(&reports[3]), &json!([1]));

    let outcome = output(&reports[4]);
    assert_eq!(outcome["outcome"], "liquidated");
    assert_eq!(outcome["ratio"], 116);
    assert_eq!(outcome["cleared"], json!([1, 2]));

    assert_eq!(output(&reports[5])["outcome"], "already_closed");
    assert_eq!(output(&reports[6])["loans"], json!([]));

    // Loan 2 was never liquidated, only dropped from the index
    let active = output(&reports[7]).as_array().unwrap().clone();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], 2);
}

/// Test: non-admin governance calls fail and leave parameters alone
#[tokio::test]
async fn test_governance_requires_admin() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();
    run(&ctx, SETUP).await;

    let reports = run(
        &ctx,
        r#"{"caller":"mallory","op":"set_minimum_ratio","value":300}
{"caller":"mallory","op":"set_liquidation_threshold","value":200}
{"caller":"mallory","op":"set_price","asset":"BTC","price":1}
{"caller":"mallory","op":"initialize"}
{"caller":"ADMIN","op":"set_minimum_ratio","value":200}
{"caller":"ADMIN","op":"set_liquidation_threshold","value":100}
{"caller":"ADMIN","op":"get_parameters"}"#,
    )
    .await;

    for report in &reports[..4] {
        assert_eq!(failure_kind(report), ErrorKind::Authorization);
    }
    output(&reports[4]);
    assert_eq!(failure_kind(&reports[5]), ErrorKind::Validation);

    let params = output(&reports[6]);
    assert_eq!(params["minimum_collateral_ratio"], 200);
    assert_eq!(params["liquidation_threshold"], 120);

    let engine = ctx.engine.read().await;
    assert_eq!(engine.get_price(lendbank_core::Asset::Btc).unwrap().price, 50_000);
}

/// Test: bad lines are reported and the run continues
#[tokio::test]
async fn test_script_continues_after_failures() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();

    let reports = run(
        &ctx,
        r#"{"caller":"alice","op":"deposit_collateral","amount":5}
not json

{"caller":"","op":"get_stats"}
{"caller":"ADMIN","op":"initialize"}
{"caller":"alice","op":"deposit_collateral","amount":5}
{"caller":"alice","op":"request_loan","collateral":1,"amount":1}"#,
    )
    .await;

    // The blank line is skipped
    assert_eq!(reports.len(), 6);
    assert_eq!(failure_kind(&reports[0]), ErrorKind::State);
    assert_eq!(failure_kind(&reports[1]), ErrorKind::Validation);
    assert_eq!(reports[1].op, None);
    assert_eq!(failure_kind(&reports[2]), ErrorKind::Validation);
    assert_eq!(reports[3].line, 5);
    assert!(reports[3].is_ok());
    assert_eq!(output(&reports[4])["total_collateral_locked"], 5);

    // No BTC price yet
    assert_eq!(failure_kind(&reports[5]), ErrorKind::State);
}

/// Test: the clock only moves forward
#[tokio::test]
async fn test_height_never_goes_back() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();

    let reports = run(
        &ctx,
        r#"{"caller":"x","height":100,"op":"get_stats"}
{"caller":"x","height":50,"op":"get_stats"}"#,
    )
    .await;

    assert_eq!(reports[0].height, 100);
    assert_eq!(reports[1].height, 100);
    assert_eq!(ctx.clock.current_height(), 100);
}

/// Test: configuration file drives the engine
#[tokio::test]
async fn test_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"admin": "GOV", "minimum_collateral_ratio": 200, "portfolio_capacity": 1}}"#
    )
    .unwrap();

    let ctx = AppContext::from_config_path(Some(file.path())).unwrap();
    assert_eq!(
        ctx.engine.read().await.admin(),
        &Principal::new("GOV").unwrap()
    );

    let reports = run(
        &ctx,
        r#"{"caller":"GOV","op":"initialize"}
{"caller":"GOV","op":"set_price","asset":"BTC","price":100}
{"caller":"alice","op":"request_loan","collateral":1,"amount":1}
{"caller":"alice","op":"request_loan","collateral":2,"amount":1}
{"caller":"alice","op":"request_loan","collateral":4,"amount":1}"#,
    )
    .await;

    // 1 x 100 < 1 x 200
    assert_eq!(failure_kind(&reports[2]), ErrorKind::Validation);
    output(&reports[3]);
    // Portfolio capacity of one
    assert_eq!(failure_kind(&reports[4]), ErrorKind::Validation);
}

/// Test: invalid configuration is rejected up front
#[tokio::test]
async fn test_invalid_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"minimum_collateral_ratio": 120, "liquidation_threshold": 130}}"#
    )
    .unwrap();

    assert!(AppContext::from_config_path(Some(file.path())).is_err());
}

/// Test: event journal export
#[tokio::test]
async fn test_export_events() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("events.jsonl");

    let ctx = AppContext::new(LendingConfig::default()).unwrap();
    run(&ctx, SETUP).await;
    run(
        &ctx,
        r#"{"caller":"alice","op":"request_loan","collateral":1,"amount":300}
{"caller":"alice","op":"request_loan","collateral":1,"amount":400}"#,
    )
    .await;

    let written = ctx.export_events(&path).await.unwrap();
    assert_eq!(written, 3);

    let lines: Vec<Value> = BufReader::new(std::fs::File::open(&path).unwrap())
        .lines()
        .map(|line| serde_json::from_str(&line.unwrap()).unwrap())
        .collect();
    let types: Vec<_> = lines.iter().map(|l| l["event"]["type"].clone()).collect();
    assert_eq!(
        types,
        vec![
            json!("initialized"),
            json!("price_updated"),
            json!("loan_originated")
        ]
    );
    assert_eq!(lines[2]["sequence"], 3);
}

/// Test: concurrent requests serialize on the engine lock
#[tokio::test]
async fn test_concurrent_requests() {
    let ctx = Arc::new(AppContext::new(LendingConfig::default()).unwrap());
    run(&ctx, SETUP).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            let line = format!(
                r#"{{"caller":"user{}","op":"request_loan","collateral":1,"amount":300}}"#,
                i
            );
            commands::execute(&ctx, serde_json::from_str(&line).unwrap()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let engine = ctx.engine.read().await;
    assert_eq!(engine.get_aggregate_stats().total_loans_issued, 8);
    let mut ids: Vec<_> = engine
        .loans_by_status(LoanStatus::Active)
        .iter()
        .map(|loan| loan.id.value())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
}

/// Test: price and event listings
#[tokio::test]
async fn test_prices_and_events_queries() {
    let ctx = AppContext::new(LendingConfig::default()).unwrap();
    run(&ctx, SETUP).await;

    let reports = run(
        &ctx,
        r#"{"caller":"ADMIN","height":3,"op":"set_price","asset":"STX","price":2}
{"caller":"x","op":"get_prices"}
{"caller":"x","op":"get_events","since":2}
{"caller":"x","op":"get_events"}"#,
    )
    .await;

    let prices = output(&reports[1]).as_array().unwrap().clone();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0]["asset"], "BTC");
    assert_eq!(prices[1]["asset"], "STX");
    assert_eq!(prices[1]["updated_at"], 3);

    let recent = output(&reports[2]).as_array().unwrap().clone();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["sequence"], 3);
    assert_eq!(recent[0]["event"]["type"], "price_updated");

    assert_eq!(output(&reports[3]).as_array().unwrap().len(), 3);
}
