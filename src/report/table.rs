use super::window::{DisplaySlice, DisplayWindow};
use crate::types::models::{DataWarning, HolderAnalysis, SummaryStats, TokenHolder};
use std::fmt::Write;
use tabled::{
    settings::{object::{Columns, Rows}, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct HolderRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Ownership %")]
    percentage: String,
    #[tabled(rename = "Type")]
    account_type: String,
}

pub fn truncate_address(address: &str) -> String {
    if !address.is_ascii() || address.len() <= 16 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 6..])
}

pub fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a normalized amount with grouped thousands and up to six decimals.
pub fn format_amount(value: f64, decimals: u8) -> String {
    let precision = decimals.min(6) as usize;
    let formatted = format!("{:.*}", precision, value);
    match formatted.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}", group_thousands(whole), fraction),
        None => group_thousands(&formatted),
    }
}

fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

pub fn render_holder_table(slice: &DisplaySlice<'_>, full_addresses: bool) -> String {
    let rows: Vec<HolderRow> = slice
        .rows
        .iter()
        .enumerate()
        .map(|(i, holder): (usize, &TokenHolder)| HolderRow {
            rank: slice.first_rank + i,
            address: if full_addresses {
                holder.address.clone()
            } else {
                truncate_address(&holder.address)
            },
            balance: format_amount(holder.normalized_balance(), holder.decimals),
            percentage: format!("{:.6}%", holder.percentage),
            account_type: holder.account_type.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()));
    table.to_string()
}

pub fn render_summary(summary: &SummaryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "Total holders: {}", format_count(summary.total_holders));
    let _ = writeln!(out, "User accounts: {}", format_count(summary.user_count));
    let _ = writeln!(out, "Program accounts: {}", format_count(summary.program_count));
    let _ = writeln!(out, "Total ownership tracked: {:.2}%", summary.total_tracked_pct);
    let _ = writeln!(out, "Top 10 holders own: {:.2}%", summary.top10_concentration_pct);
    let _ = writeln!(out, "Top 100 holders own: {:.2}%", summary.top100_concentration_pct);
    out
}

pub fn render_warnings(warnings: &[DataWarning]) -> Option<String> {
    if warnings.is_empty() {
        return None;
    }

    let missing = warnings
        .iter()
        .filter(|w| matches!(w, DataWarning::MissingExecutableFlag { .. }))
        .count();

    let mut out = String::from("WARNINGS\n");
    for warning in warnings
        .iter()
        .filter(|w| !matches!(w, DataWarning::MissingExecutableFlag { .. }))
    {
        let _ = writeln!(out, "  - {}", warning);
    }
    if missing > 0 {
        let _ = writeln!(
            out,
            "  - {} holder(s) had no account info and were classified as USER",
            format_count(missing)
        );
    }
    Some(out)
}

/// Full text report: header, ranked table for `window`, summary and warnings.
/// The summary always covers every holder regardless of the window.
pub fn render_report(analysis: &HolderAnalysis, window: &DisplayWindow, full_addresses: bool) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "TOKEN HOLDER ANALYSIS: {}", analysis.mint);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Total supply: {} ({} decimals)",
        format_amount(analysis.supply.normalized(), analysis.supply.decimals),
        analysis.supply.decimals
    );
    let _ = writeln!(out, "Token accounts: {}", format_count(analysis.token_accounts));
    match analysis.snapshot.slot {
        Some(slot) => {
            let _ = writeln!(
                out,
                "Snapshot: slot {} at {}",
                slot,
                analysis.snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => {
            let _ = writeln!(
                out,
                "Snapshot: {}",
                analysis.snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }
    let _ = writeln!(out);

    let total = analysis.holders.len();
    if total == 0 {
        let _ = writeln!(out, "No token holders found");
    } else if window.starts_beyond(total) {
        if let DisplayWindow::Ranks { start, .. } = window {
            let _ = writeln!(out, "Start rank {} exceeds total holders ({})", start, format_count(total));
        }
    } else {
        let slice = window.select(&analysis.holders);
        let _ = writeln!(out, "{}", render_holder_table(&slice, full_addresses));
        let _ = writeln!(
            out,
            "Showing {} of {} total holders",
            window.describe(&slice),
            format_count(total)
        );
    }

    let _ = writeln!(out);
    out.push_str(&render_summary(&analysis.summary));

    if let Some(warnings) = render_warnings(&analysis.warnings) {
        let _ = writeln!(out);
        out.push_str(&warnings);
    }
    out
}
