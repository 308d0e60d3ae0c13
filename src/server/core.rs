use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::handlers::handle_error;
use crate::error::{FtError, TransferError};
use crate::server::session::{SessionOutcome, handle_control_connection};
use crate::storage::ResourceProvider;

/// Sequential server: one control connection is driven to completion before
/// the next one is accepted.
pub struct Server {
    listener: TcpListener,
    provider: ResourceProvider,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self, FtError> {
        let control_socket = config.control_socket();
        let addr: SocketAddr = control_socket
            .parse()
            .map_err(|_| FtError::Usage(format!("invalid bind address {}", control_socket)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TransferError::PortBindingFailed(addr, e))?;
        info!("Server bound to {}", listener.local_addr().unwrap_or(addr));

        let root = config.server_root_path();
        match root.canonicalize() {
            Ok(abs) if abs.is_dir() => info!("Serving files from {}", abs.display()),
            _ => warn!("Server root {} is not a readable directory", root.display()),
        }

        Ok(Self {
            listener,
            provider: ResourceProvider::new(root),
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts and serves clients until `shutdown` completes. Any connection
    /// still open at that point is closed before returning.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            info!("Waiting for connection...");
            let (mut control, peer) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        continue;
                    }
                },
            };
            info!("Client connection established: {}", peer);

            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Shutdown requested while serving {}, dropping connections", peer);
                    return;
                }
                outcome = handle_control_connection(&mut control, peer, &self.provider, &self.config) => {
                    match outcome {
                        Ok(SessionOutcome::Delivered { bytes, acknowledged }) => info!(
                            "Transfer to {} complete: {} bytes (acknowledged: {})",
                            peer, bytes, acknowledged
                        ),
                        Ok(SessionOutcome::Rejected(e)) => info!("Request from {} refused: {}", peer, e),
                        Ok(SessionOutcome::Disconnected) => {}
                        Err(e) => handle_error(&e),
                    }
                }
            }

            drop(control);
            info!("Client connection closed: {}", peer);
        }
    }
}
