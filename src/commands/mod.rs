use clap::{Parser, Subcommand};
use colored::Colorize;

pub mod report;
pub mod run;

/// Discovery-based micro benchmark runner
#[derive(Parser)]
#[command(name = "microbench", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Run(run::RunArgs),
    Report(report::ReportArgs),
}

pub fn entry(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(cmd) => cmd.run(),
        Commands::Report(cmd) => cmd.run(),
    }
}

#[doc(hidden)]
pub fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = entry(&cli) {
        eprintln!("❌ {}: {}", "ERROR".red().bold(), err.to_string().red());
        std::process::exit(1);
    }
    Ok(())
}
