//! CLI module for the IP Key Service

pub mod serve;

use clap::{Parser, Subcommand};

/// IP Key Service - per-client access keys with automatic TTL expiry
#[derive(Parser)]
#[command(name = "ip-key-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}
