//! Module `data_channel`
//!
//! Establishes the per-request data connection. The server always dials out
//! to a port the client is already listening on; the client binds that port
//! before it sends its request.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

use crate::error::TransferError;

/// Connects to the client's data port, retrying with a doubling delay.
///
/// The client binds its listener before sending the request, so the first
/// attempt normally succeeds; the retries only cover a slow peer.
pub async fn connect_data_stream(
    addr: SocketAddr,
    max_attempts: u32,
    initial_backoff: Duration,
) -> Result<TcpStream, TransferError> {
    let max_attempts = max_attempts.max(1);
    let mut delay = initial_backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Data connection established with {} (attempt {})", addr, attempt);
                return Ok(stream);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Data connect to {} failed (attempt {}/{}): {}. Retrying in {:?}",
                    addr, attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                error!(
                    "Giving up on data connection to {} after {} attempts: {}",
                    addr, attempt, e
                );
                return Err(TransferError::DataConnectFailed {
                    addr,
                    attempts: attempt,
                    source: e,
                });
            }
        }
    }
}

/// Binds the listener the server will connect back to.
pub async fn bind_data_listener(addr: SocketAddr) -> Result<TcpListener, TransferError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TransferError::PortBindingFailed(addr, e))?;
    info!(
        "Listening for data connection on {}",
        listener.local_addr().unwrap_or(addr)
    );
    Ok(listener)
}

/// Accepts the server's inbound data connection.
pub async fn accept_data_stream(listener: &TcpListener) -> Result<TcpStream, TransferError> {
    let (stream, peer) = listener.accept().await.map_err(TransferError::AcceptFailed)?;
    info!("Data connection accepted from {}", peer);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_to_bound_listener() {
        let listener = bind_data_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (connected, accepted) = tokio::join!(
            connect_data_stream(addr, 1, Duration::from_millis(10)),
            accept_data_stream(&listener)
        );
        assert!(connected.is_ok());
        assert!(accepted.is_ok());
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        // Reserve a port, then release it so nothing is listening there.
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = connect_data_stream(addr, 3, Duration::from_millis(5))
            .await
            .unwrap_err();
        match err {
            TransferError::DataConnectFailed { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn binding_a_taken_port_fails() {
        let taken = bind_data_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = taken.local_addr().unwrap();

        let err = bind_data_listener(addr).await.unwrap_err();
        assert!(matches!(err, TransferError::PortBindingFailed(a, _) if a == addr));
    }
}
