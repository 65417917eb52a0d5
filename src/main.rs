use anyhow::Result;
use clap::Parser;

use coverage_report::cli::{Cli, Commands};
use coverage_report::commands::{run_collections, run_report};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report(args) => {
            run_report(args)?;
        }
        Commands::Collections(args) => {
            run_collections(args)?;
        }
    }

    Ok(())
}
