// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Examsheet — exam paper builder
//
// Entry point. Initialises logging, parses the command line, and dispatches to
// the build, plan, and inspect subcommands.

mod commands;
mod manifest;
mod paths;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "examsheet")]
#[command(about = "Lay out question images on two-column A4 exam sheets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the exam PDF described by a manifest
    Build {
        /// Manifest JSON: header, image paths, background matching
        #[arg(short, long)]
        manifest: PathBuf,
        /// Output PDF. Defaults to a name derived from school and subject
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export configuration JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print how a manifest paginates, without rendering
    Plan {
        #[arg(short, long)]
        manifest: PathBuf,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show page count and page sizes of a PDF
    Inspect {
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            manifest,
            output,
            config,
        } => match commands::build::run(&manifest, output, config).await? {
            Some(path) => println!("{}", path.display()),
            None => println!("no images in {}, nothing exported", manifest.display()),
        },
        Commands::Plan { manifest, json } => {
            let pagination = commands::plan::run(&manifest)?;
            print!("{}", commands::plan::render(&pagination, json)?);
            if json {
                println!();
            }
        }
        Commands::Inspect { pdf } => {
            print!("{}", commands::inspect::run(&pdf)?);
        }
    }
    Ok(())
}
