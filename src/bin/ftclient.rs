//! ftclient - Entry Point
//!
//! Requests a directory listing or a file from `ftserver`.

use clap::{ArgGroup, Parser};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

use ftlink::error::TransferError;
use ftlink::protocol::Operation;
use ftlink::utils::logging::setup_logging;
use ftlink::utils::validation::validate_port;
use ftlink::{Client, Delivery, FtError, Settings};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch a directory listing or a file from ftserver",
    group(ArgGroup::new("mode").required(true).args(["list", "get"]))
)]
struct Args {
    /// Server host name or address
    host: String,

    /// Server control port
    control_port: u16,

    /// Port this client listens on for the data connection
    data_port: u16,

    /// Request the server's directory listing
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Request the named file
    #[arg(short = 'g', long = "get", value_name = "FILENAME")]
    get: Option<String>,

    /// Directory to save downloads into (overrides download_dir from the config)
    #[arg(long)]
    download_dir: Option<PathBuf>,

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

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), FtError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(dir) = &args.download_dir {
        settings.client.download_dir = dir.to_string_lossy().into_owned();
    }

    let control_port = validate_port(args.control_port)?;
    let data_port = validate_port(args.data_port)?;

    let operation = match args.get {
        Some(name) => Operation::Get(name),
        None => Operation::List,
    };

    let client = Client::new(args.host.clone(), control_port, settings.client);
    match client.run(&operation, data_port).await {
        Ok(Delivery::Listing(listing)) => {
            println!(
                "Receiving directory structure from {}:{}",
                args.host, data_port
            );
            print!("{}", listing);
            Ok(())
        }
        Ok(Delivery::Saved(path)) => {
            println!("File transfer complete: {}", path.display());
            Ok(())
        }
        Err(FtError::Transfer(TransferError::Rejected(msg))) => {
            eprintln!("{}:{} says {}", args.host, control_port, msg);
            Err(FtError::Transfer(TransferError::Rejected(msg)))
        }
        Err(e) => Err(e),
    }
}
