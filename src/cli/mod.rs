//! CLI module for nile-cgpa
//!
//! - `serve`: HTTP API with the monthly grades cache
//! - `fetch`: one uncached scrape, printed as JSON

pub mod fetch;
pub mod serve;

use clap::{Parser, Subcommand};

/// Student portal grades gateway
#[derive(Parser)]
#[command(name = "nile-cgpa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Scrape grades once and print them, bypassing the cache
    Fetch(fetch::FetchArgs),
}
