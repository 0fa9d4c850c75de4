mod scenario;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scenario::Scenario;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario TOML file to evaluate
    #[arg(short, long)]
    scenario: PathBuf,
    /// Pretty-print the JSON report
    #[arg(short, long)]
    pretty: bool,
    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let scenario = Scenario::load(&args.scenario)?;
    let report = scenario.run()?;

    match &args.output {
        Some(path) => {
            report
                .write_atomic(path, args.pretty)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{}", report.to_json(args.pretty)?),
    }
    Ok(())
}
