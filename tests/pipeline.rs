//! Holder analysis pipeline tests
//!
//! Drive `analyze_token_holders` end to end through `MockGateway`:
//! gateway -> aggregation -> summary -> rendering. No network access.

use approx::assert_relative_eq;
use holderscope::gateway::{GatewayError, MockGateway};
use holderscope::report::{render_report, DisplayWindow};
use holderscope::services::retry::RetryPolicy;
use holderscope::services::token::analyze_token_holders;
use holderscope::types::models::{AccountType, DataWarning, SummaryStats};
use std::time::Duration;

const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

// ============================================================================
// Aggregation through the pipeline
// ============================================================================

#[tokio::test]
async fn merges_accounts_per_owner_and_ranks() {
    let gateway = MockGateway::new()
        .with_supply(200, 0)
        .with_slot(42)
        .with_account("A", 100)
        .with_account("B", 50)
        .with_account("A", 25)
        .with_flag("A", false)
        .with_flag("B", false);

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    assert_eq!(analysis.token_accounts, 3);
    assert_eq!(analysis.holders.len(), 2);
    assert_eq!(analysis.holders[0].address, "A");
    assert_eq!(analysis.holders[0].raw_balance, 125);
    assert_relative_eq!(analysis.holders[0].percentage, 62.5);
    assert_eq!(analysis.holders[1].address, "B");
    assert_relative_eq!(analysis.holders[1].percentage, 25.0);
    assert_eq!(analysis.snapshot.slot, Some(42));
}

#[tokio::test]
async fn all_zero_balances_yield_empty_report() {
    let gateway = MockGateway::new()
        .with_supply(1_000, 6)
        .with_account("A", 0)
        .with_account("B", 0);

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    assert!(analysis.holders.is_empty());
    assert_eq!(analysis.summary, SummaryStats::default());
}

#[tokio::test]
async fn limit_only_affects_rendering() {
    let mut gateway = MockGateway::new().with_supply(10_000, 0);
    for i in 0..15 {
        let owner = format!("Holder{:02}", i);
        gateway = gateway.with_account(&owner, 100).with_flag(&owner, false);
    }

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();
    assert_eq!(analysis.summary.total_holders, 15);
    assert_relative_eq!(analysis.summary.top10_concentration_pct, 10.0, epsilon = 1e-9);
    assert_relative_eq!(analysis.summary.top100_concentration_pct, 15.0, epsilon = 1e-9);

    let window = DisplayWindow::Top(10);
    assert_eq!(window.select(&analysis.holders).rows.len(), 10);

    let report = render_report(&analysis, &window, true);
    assert!(report.contains("Holder09"));
    assert!(!report.contains("Holder10"));
    assert!(report.contains("Total holders: 15"));
}

#[tokio::test]
async fn missing_flag_is_user_and_warned() {
    let gateway = MockGateway::new()
        .with_supply(100, 0)
        .with_account("A", 50)
        .with_account("B", 30)
        .with_account("C", 20)
        .with_flag("A", true)
        .with_flag("B", false);

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    let c = analysis.holders.iter().find(|h| h.address == "C").unwrap();
    assert_eq!(c.account_type, AccountType::User);
    assert!(analysis.warnings.contains(&DataWarning::MissingExecutableFlag {
        address: "C".to_string()
    }));
    assert_eq!(analysis.summary.program_count, 1);
    assert_eq!(analysis.summary.user_count, 2);
}

#[tokio::test]
async fn zero_supply_is_not_fatal() {
    let gateway = MockGateway::new()
        .with_supply(0, 9)
        .with_account("A", 5)
        .with_flag("A", false);

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    assert_eq!(analysis.holders.len(), 1);
    assert_eq!(analysis.holders[0].percentage, 0.0);
    assert_eq!(analysis.warnings, vec![DataWarning::ZeroSupply]);
}

#[tokio::test]
async fn only_funded_owners_are_classified() {
    let gateway = MockGateway::new()
        .with_supply(10, 0)
        .with_account("A", 10)
        .with_account("Empty", 0)
        .with_flag("A", false);

    analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    assert_eq!(gateway.call_count("get_executable_flags"), 1);
    assert_eq!(gateway.call_count("get_account_executable_flag"), 0);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn malformed_mint_fails_before_any_rpc_call() {
    let gateway = MockGateway::new().with_supply(10, 0);

    let result = analyze_token_holders(&gateway, "not a mint", &fast_retry()).await;

    assert!(matches!(result, Err(GatewayError::InvalidMint(_))));
    assert!(gateway.get_calls().is_empty());
}

#[tokio::test]
async fn unknown_mint_aborts_before_aggregation() {
    let gateway = MockGateway::new().fail_next(
        "get_token_supply",
        GatewayError::InvalidMint("not a Token mint".into()),
    );

    let result = analyze_token_holders(&gateway, MINT, &fast_retry()).await;

    assert!(matches!(result, Err(GatewayError::InvalidMint(_))));
    assert_eq!(gateway.call_count("get_token_accounts_by_mint"), 0);
}

#[tokio::test]
async fn rate_limits_are_retried() {
    let gateway = MockGateway::new()
        .with_supply(10, 0)
        .with_account("A", 10)
        .with_flag("A", false)
        .fail_next("get_token_accounts_by_mint", GatewayError::RateLimited("429".into()))
        .fail_next("get_token_accounts_by_mint", GatewayError::RateLimited("429".into()));

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    assert_eq!(analysis.holders.len(), 1);
    assert_eq!(gateway.call_count("get_token_accounts_by_mint"), 3);
}

#[tokio::test]
async fn exhausted_retries_abort_the_run() {
    let mut gateway = MockGateway::new().with_supply(10, 0).with_account("A", 10);
    for _ in 0..4 {
        gateway = gateway.fail_next("get_executable_flags", GatewayError::Network("timeout".into()));
    }

    let result = analyze_token_holders(&gateway, MINT, &fast_retry()).await;

    assert!(matches!(result, Err(GatewayError::Network(_))));
    assert_eq!(gateway.call_count("get_executable_flags"), 4);
}

#[tokio::test]
async fn slot_failure_only_drops_the_slot() {
    let gateway = MockGateway::new()
        .with_supply(10, 0)
        .with_account("A", 10)
        .with_flag("A", false)
        .fail_next("get_slot", GatewayError::InvalidMint("unexpected".into()));

    let analysis = analyze_token_holders(&gateway, MINT, &RetryPolicy::none()).await.unwrap();

    assert_eq!(analysis.snapshot.slot, None);
    assert_eq!(analysis.holders.len(), 1);
}

#[tokio::test]
async fn rejected_account_scan_is_not_retried() {
    let gateway = MockGateway::new().with_supply(10, 0).with_account("A", 10).fail_next(
        "get_token_accounts_by_mint",
        GatewayError::Rejected("excluded from account secondary indexes".into()),
    );

    let result = analyze_token_holders(&gateway, MINT, &fast_retry()).await;

    assert!(matches!(result, Err(GatewayError::Rejected(_))));
    assert_eq!(gateway.call_count("get_token_accounts_by_mint"), 1);
}

#[tokio::test]
async fn flag_retry_refetches_only_the_failed_batch() {
    let mut gateway = MockGateway::new().with_supply(600, 0).with_flag_batch_size(2);
    for owner in ["A", "B", "C", "D", "E", "F"] {
        gateway = gateway.with_account(owner, 100).with_flag(owner, false);
    }
    let gateway = gateway.fail_batch_containing("C", GatewayError::RateLimited("429".into()));

    let analysis = analyze_token_holders(&gateway, MINT, &fast_retry()).await.unwrap();

    assert_eq!(analysis.holders.len(), 6);
    assert!(analysis.warnings.is_empty());
    assert_eq!(gateway.call_count("get_executable_flags"), 4);
    let batches = gateway.flag_batches();
    assert_eq!(batches.iter().filter(|b| b.contains(&"A".to_string())).count(), 1);
    assert_eq!(batches.iter().filter(|b| b.contains(&"C".to_string())).count(), 2);
}
