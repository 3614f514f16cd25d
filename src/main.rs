use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use holderscope::cli::CliApp;
use holderscope::config::Config;
use holderscope::gateway::SolanaGateway;
use holderscope::report::{self, export};
use holderscope::services::retry::RetryPolicy;
use holderscope::services::token::analyze_token_holders;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);
    app.validate()?;

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(rpc) = &app.rpc {
        config.rpc_url = rpc.clone();
    }
    if app.program_owned {
        config.classify_program_owned = true;
    }

    let mint = match &app.mint {
        Some(mint) => mint.trim().to_string(),
        None => prompt_for_mint()?,
    };

    tracing::info!("Using RPC endpoint {}", config.rpc_url);
    let gateway = SolanaGateway::from_config(&config);
    gateway.log_node_version().await;

    let retry = RetryPolicy::from_config(&config);
    let analysis = analyze_token_holders(&gateway, &mint, &retry)
        .await
        .with_context(|| format!("Failed to analyze holders of {}", mint))?;

    if !app.csv_only {
        println!("{}", report::render_report(&analysis, &app.display_window(), app.full_address));
    }

    if app.wants_csv() {
        let path = app.csv_file.clone().unwrap_or_else(|| {
            PathBuf::from(export::default_csv_filename(&analysis.mint, analysis.snapshot.timestamp))
        });
        let rows = export::export_csv(&path, &analysis)?;
        println!("CSV export: {} ({} holders)", path.display(), rows);
    }

    Ok(())
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else if verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn prompt_for_mint() -> Result<String> {
    print!("Enter token mint address: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let mint = input.trim();
    if mint.is_empty() {
        anyhow::bail!("Token mint address is required");
    }
    Ok(mint.to_string())
}
