//! Lowpoly CLI - Generate and export low-poly terrain meshes

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::export::ExportFormat;
use commands::{generate, init};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lowpoly")]
#[command(about = "Procedural low-poly terrain generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Init {
        /// Config file to create
        #[arg(default_value = "lowpoly.toml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate a terrain mesh and save it
    Generate {
        /// Path to config file (defaults to ./lowpoly.toml when present)
        #[arg(short, long)]
        config: Option<String>,

        /// Directory the mesh is written to
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Mesh file format
        #[arg(long, default_value = "obj", value_parser = parse_format)]
        format: ExportFormat,

        /// Override the noise seed
        #[arg(long, conflicts_with = "new_seed")]
        seed: Option<i32>,

        /// Pick a random noise seed before generating
        #[arg(long)]
        new_seed: bool,

        /// Seed point placement and random coloring
        #[arg(long)]
        sampling_seed: Option<u64>,

        /// Print statistics without writing a file
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, force } => init::run(&path, force),
        Commands::Generate {
            config,
            output,
            format,
            seed,
            new_seed,
            sampling_seed,
            dry_run,
        } => generate::run(generate::GenerateArgs {
            config,
            output,
            format,
            seed,
            new_seed,
            sampling_seed,
            dry_run,
        }),
    }
}
