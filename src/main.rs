use clap::Parser;
use nile_cgpa::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Fetch(args) => cli::fetch::run(args).await,
    }
}
