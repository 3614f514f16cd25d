//! Holderscope - SPL token holder distribution report
//!
//! - `gateway`: RPC access (`TokenGateway` trait, Solana and mock implementations)
//! - `services`: holder aggregation, summary statistics, retry and the analysis pipeline
//! - `report`: table rendering, display windows and CSV export
//! - `config`: environment-driven settings
//! - `cli`: command-line arguments

pub mod cli;
pub mod config;
pub mod gateway;
pub mod report;
pub mod services;
pub mod types;
