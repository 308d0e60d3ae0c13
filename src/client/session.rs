//! Client request sequence
//!
//! Connects to the server, listens for the data connection, sends the
//! request, receives the payload and acknowledges it, then delivers the
//! result locally.

use log::{info, warn};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::error::{FtError, StorageError, TransferError};
use crate::protocol::responses::OK;
use crate::protocol::{Operation, Request, Response};
use crate::storage::Payload;
use crate::transfer::{accept_data_stream, bind_data_listener, receive_payload, save_with_dedup};

/// What the client ends up with after a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Listing text, one file name per line.
    Listing(String),
    /// Where the downloaded file was written.
    Saved(PathBuf),
}

pub struct Client {
    host: String,
    control_port: u16,
    config: ClientConfig,
}

impl Client {
    pub fn new(host: impl Into<String>, control_port: u16, config: ClientConfig) -> Self {
        Self {
            host: host.into(),
            control_port,
            config,
        }
    }

    /// Performs the request and delivers its result.
    pub async fn run(&self, operation: &Operation, data_port: u16) -> Result<Delivery, FtError> {
        let payload = self.fetch(operation, data_port).await?;
        self.deliver(operation, payload)
    }

    /// Performs the request and returns the raw payload.
    ///
    /// `data_port` 0 listens on an ephemeral port; the bound port is what
    /// gets sent to the server.
    pub async fn fetch(&self, operation: &Operation, data_port: u16) -> Result<Payload, FtError> {
        if let Operation::Get(name) = operation {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(FtError::Usage(format!("invalid filename {:?}", name)));
            }
        }

        let target = format!("{}:{}", self.host, self.control_port);
        let mut control = TcpStream::connect((self.host.as_str(), self.control_port))
            .await
            .map_err(|e| TransferError::ControlConnectFailed(target.clone(), e))?;
        info!("Connected to {}", target);

        // Listen before the request goes out so the server's connect finds us.
        let local_ip = control.local_addr()?.ip();
        let listener = bind_data_listener(SocketAddr::new(local_ip, data_port)).await?;
        let request = Request::new(operation.clone(), listener.local_addr()?.port());

        info!("Sending request: {}", request);
        control.write_all(request.to_string().as_bytes()).await?;
        control.flush().await?;

        let response = self.read_response(&mut control).await?;
        if !response.is_ok() {
            return Err(TransferError::Rejected(response.as_str().to_string()).into());
        }

        // The server closes the control connection if it cannot reach our listener.
        let data = tokio::select! {
            accepted = accept_data_stream(&listener) => accepted?,
            abandoned = watch_for_close(&mut control) => return Err(abandoned.into()),
        };
        drop(listener);

        let payload = receive_payload(
            data,
            self.config.max_header_length,
            self.config.recv_buffer_size,
        )
        .await?;
        info!("Received {} bytes", payload.len());

        control.write_all(OK.as_bytes()).await?;
        control.flush().await?;
        if let Err(e) = control.shutdown().await {
            warn!("Failed to close control connection: {}", e);
        }

        Ok(payload)
    }

    async fn read_response(&self, control: &mut TcpStream) -> Result<Response, FtError> {
        let mut buffer = vec![0u8; self.config.response_buffer_size];
        let n = control.read(&mut buffer).await?;
        if n == 0 {
            return Err(TransferError::EmptyResponse.into());
        }

        let response = Response::parse(&String::from_utf8_lossy(&buffer[..n]));
        info!("Server responded: {}", response.as_str());
        Ok(response)
    }

    fn deliver(&self, operation: &Operation, payload: Payload) -> Result<Delivery, FtError> {
        match operation {
            Operation::List => Ok(Delivery::Listing(
                String::from_utf8_lossy(payload.as_bytes()).into_owned(),
            )),
            Operation::Get(name) => {
                // Only the final component is used locally.
                let local_name = Path::new(name)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| StorageError::NotAFile(name.clone()))?;
                let path = save_with_dedup(
                    &self.config.download_dir_path(),
                    local_name,
                    payload.as_bytes(),
                )?;
                Ok(Delivery::Saved(path))
            }
        }
    }
}

/// Resolves once the peer closes or breaks the control connection.
async fn watch_for_close(control: &mut TcpStream) -> TransferError {
    let mut buffer = [0u8; 64];
    loop {
        match control.read(&mut buffer).await {
            Ok(0) => {
                warn!("Server closed the control connection before opening the data connection");
                return TransferError::DataConnectionAbandoned;
            }
            Ok(n) => warn!(
                "Ignoring {} unexpected bytes on the control connection",
                n
            ),
            Err(e) => {
                warn!("Control connection failed while waiting for data: {}", e);
                return TransferError::DataConnectionAbandoned;
            }
        }
    }
}
