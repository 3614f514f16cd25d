use crate::types::models::{AccountType, SummaryStats, TokenHolder};

/// Expects `holders` already ranked by balance; the slice is not re-sorted.
pub fn summarize(holders: &[TokenHolder]) -> SummaryStats {
    let program_count = holders
        .iter()
        .filter(|h| h.account_type == AccountType::Program)
        .count();

    let top_n = |n: usize| -> f64 { holders.iter().take(n).map(|h| h.percentage).sum() };

    let stats = SummaryStats {
        total_holders: holders.len(),
        user_count: holders.len() - program_count,
        program_count,
        top10_concentration_pct: top_n(10),
        top100_concentration_pct: top_n(100),
        total_tracked_pct: holders.iter().map(|h| h.percentage).sum(),
    };

    tracing::info!("Top 10 Holders: {:.2}%", stats.top10_concentration_pct);
    tracing::info!("Top 100 Holders: {:.2}%", stats.top100_concentration_pct);
    stats
}
