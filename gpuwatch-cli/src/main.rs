use clap::Parser;
use gpuwatch_cli::commands::{run_exporter, RunArgs};
use gpuwatch_cli::config;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// gpuwatch - GPU telemetry exporter
#[derive(Parser)]
#[command(name = "gpuwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // stdout carries the records, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(cli.verbose > 1)
        .init();

    // Load config if specified
    if let Some(config_path) = &cli.config {
        config::set_config_path(config_path);
    }

    if let Err(e) = run_exporter(cli.run).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
