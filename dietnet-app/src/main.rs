use anyhow::Result;
use clap::{Parser, Subcommand};

mod config;
mod plotting;
mod workflow;

/// Build diet-microbiome graphs and compare them across samples.
#[derive(Debug, Parser)]
#[command(name = "dietnet", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build node and edge tables from metabolome predictions
    Metabolome(workflow::MetabolomeArgs),
    /// Build node and edge tables from whole-genome predictions
    Genome(workflow::GenomeArgs),
    /// Compare sample graphs by KO content, pattern by pattern
    Compare(workflow::CompareArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Metabolome(args) => workflow::run_metabolome(&args),
        Command::Genome(args) => workflow::run_genome(&args),
        Command::Compare(args) => workflow::run_compare(&args),
    }
}
