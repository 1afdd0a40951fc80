// src/main.rs

mod analyzer;
mod cli;
mod config;
mod error;
mod extractor;
mod model;
mod renderer;
mod vcs;

use analyzer::ChangeSetAnalyzer;
use clap::Parser;
use cli::Args;
use config::IgnoreConfig;
use extractor::SourceObjectExtractor;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use vcs::GitRepository;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let repo = GitRepository::discover(&args.path)?;
    let config = IgnoreConfig::load(&args.config)?;

    let analyzer = ChangeSetAnalyzer::new(&repo, &config, SourceObjectExtractor::python());
    let results = analyzer.analyze(args.staged_only)?;
    tracing::debug!("analysis finished in {:.2?}", start_time.elapsed());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    renderer::render_report(&results, &mut out).map_err(error::MonitorError::from)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
