//! sugarfree: transpile a source tree of TypeScript, Flow and JSX to plain
//! JavaScript.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level());

    let summary = orchestrator::run(&args)?;
    if !args.quiet {
        println!("{}", summary.format(&args.out_dir));
    }
    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}
