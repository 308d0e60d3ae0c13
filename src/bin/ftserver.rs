//! ftserver - Entry Point
//!
//! Serves directory listings and file contents to `ftclient`, one client at
//! a time.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use ftlink::utils::logging::setup_logging;
use ftlink::utils::validation::validate_port;
use ftlink::{Server, Settings};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Serve directory listings and files to ftclient")]
struct Args {
    /// Control port to listen on (1024-65535)
    port: u16,

    /// Directory to serve (overrides server_root from the config)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Config file to load instead of ./ftlink.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    settings.server.control_port = match validate_port(args.port) {
        Ok(port) => port,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(root) = args.root {
        settings.server.server_root = root.to_string_lossy().into_owned();
    }

    let server = match Server::bind(settings.server).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Welcome to ftserver! (press CTRL-C at any time to exit)");
    server.run(shutdown_signal()).await;

    println!("ftserver is exiting... Goodbye!");
    ExitCode::SUCCESS
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
