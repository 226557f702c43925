/*
 * main.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * poly-bench CLI entry point.
 */

//! poly-bench CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;
mod roots;

#[derive(Parser)]
#[command(name = "polybench")]
#[command(version)]
#[command(about = "poly-bench document checker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a .bench document and its embedded Go, TypeScript and Rust code
    Check {
        /// The .bench file to check
        file: PathBuf,

        /// Go module used to resolve imports in Go blocks
        #[arg(long, value_name = "DIR")]
        go_root: Option<PathBuf>,

        /// Node project used to resolve imports in TypeScript blocks
        #[arg(long, value_name = "DIR")]
        ts_root: Option<PathBuf>,

        /// Cargo project used to resolve crates in Rust blocks
        #[arg(long, value_name = "DIR")]
        rust_root: Option<PathBuf>,

        /// Only run the structural and semantic checks
        #[arg(long)]
        no_foreign: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = commands::check::OutputFormat::Text)]
        format: commands::check::OutputFormat,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polybench=info,polybench_checkers=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            go_root,
            ts_root,
            rust_root,
            no_foreign,
            format,
        } => {
            let outcome = commands::check::execute(commands::check::CheckArgs {
                file,
                go_root,
                ts_root,
                rust_root,
                no_foreign,
                format,
            })?;
            if outcome.errors > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
