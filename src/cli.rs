// src/cli.rs

use crate::config::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

/// Analyzes a Git repository for function and class level changes.
///
/// By default all uncommitted changes are shown. Use --staged-only in
/// pre-commit hooks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the Git repository
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Only analyze staged files (for pre-commit hooks)
    #[arg(long)]
    pub staged_only: bool,

    /// Config file with ignore patterns and extensions to check
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}
