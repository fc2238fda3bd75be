use crate::commands::{self, CommandReport};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "logreap",
    version,
    about = "Rotate aged log files into monthly zip archives, verify before deleting, prune by retention."
)]
struct Cli {
    /// Emit the command report as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rotate aged log files into monthly archives, then prune if retention
    /// is configured.
    Rotate(commands::rotate::RotateArgs),
    /// Prune archives older than the retention window.
    Prune(commands::prune::PruneArgs),
    /// Show the resolved host label and effective configuration.
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = match &cli.command {
        Commands::Rotate(args) => commands::rotate::run(args)?,
        Commands::Prune(args) => commands::prune::run(args)?,
        Commands::Status => commands::status::run()?,
    };
    print_report(&report, cli.json)
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let verdict = if report.ok { "ok" } else { "completed with issues" };
    println!("{}: {verdict}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  ! {issue}");
    }
    Ok(())
}
