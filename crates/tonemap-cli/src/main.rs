mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tonemap", about = "HDR to SDR tone mapping for planar float frames")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tone-map a single HDR image
    Apply(commands::apply::ApplyArgs),
    /// Tone-map a raw planar float video stream
    Stream(commands::stream::StreamArgs),
    /// Print how a curve maps a range of signal values
    Curve(commands::curve::CurveArgs),
    /// Show image dimensions and signal statistics
    Info(commands::info::InfoArgs),
    /// Print or save the default configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Apply(args) => commands::apply::run(args),
        Commands::Stream(args) => commands::stream::run(args),
        Commands::Curve(args) => commands::curve::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
