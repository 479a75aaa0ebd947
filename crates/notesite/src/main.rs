//! notesite CLI - serve a directory of notes as a browsable site.

mod error;
mod output;

use std::path::PathBuf;

use clap::Parser;
use notesite_config::Config;
use notesite_server::{Listen, run_server, server_config_from_site_config};
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

/// notesite - serve a directory of notes as a browsable site.
#[derive(Parser)]
#[command(name = "notesite", version, about)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(&cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let output = Output::new();

    let config = Config::load(&cli.config)?;
    let server_config = server_config_from_site_config(&config)?;

    match &server_config.listen {
        Listen::Port(port) => output.info(&format!("Listening on port {port}")),
        Listen::Sock(sock) => output.info(&format!("Listening on socket {}", sock.display())),
    }
    output.info(&format!(
        "Note root: {}",
        config.notes.note_root.display()
    ));
    output.info(&format!(
        "Template root: {}",
        config.template.template_root.display()
    ));

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    rt.block_on(run_server(server_config))?;
    Ok(())
}
