//! Control connection handling
//!
//! Drives a single request/response cycle on an accepted control connection:
//! read the command, resolve it, acknowledge, then push the payload over a
//! data connection opened back to the client.

use log::{info, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::error::handlers::error_to_response;
use crate::error::{FtError, ProtocolError};
use crate::protocol::{Operation, Response, parse_request};
use crate::storage::{Payload, ResourceProvider};
use crate::transfer::{connect_data_stream, send_all, send_header};

/// How a control connection ended when no transport error occurred.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The peer closed or failed before sending a command.
    Disconnected,
    /// The request was refused with the given error literal.
    Rejected(ProtocolError),
    /// The payload was sent in full.
    Delivered { bytes: usize, acknowledged: bool },
}

/// Runs one request cycle. The caller owns and closes `control`.
pub async fn handle_control_connection(
    control: &mut TcpStream,
    peer: SocketAddr,
    provider: &ResourceProvider,
    config: &ServerConfig,
) -> Result<SessionOutcome, FtError> {
    let mut buffer = vec![0u8; config.max_command_length];
    let n = match control.read(&mut buffer).await {
        Ok(0) => {
            info!("Client {} closed the connection before sending a command", peer);
            return Ok(SessionOutcome::Disconnected);
        }
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to receive command from {}: {}", peer, e);
            return Ok(SessionOutcome::Disconnected);
        }
    };

    let command = String::from_utf8_lossy(&buffer[..n]);
    info!("Command received from {}: {}", peer, command.trim_end());

    let request = match parse_request(&command) {
        Ok(request) => request,
        Err(e) => return reject(control, peer, e).await,
    };

    let resolved = match &request.operation {
        Operation::List => provider.list_directory(),
        Operation::Get(name) => provider.read_file(name),
    };
    let payload = match resolved {
        Ok(payload) => payload,
        Err(e) => return reject(control, peer, e).await,
    };

    send_response(control, &Response::Ok).await?;

    let data_addr = config.data_socket_for(peer, request.data_port);
    let mut data = connect_data_stream(
        data_addr,
        config.data_connect_attempts,
        config.data_connect_backoff(),
    )
    .await?;

    let sent = transmit(&mut data, &payload).await;
    if let Err(e) = data.shutdown().await {
        warn!("Failed to close data connection to {}: {}", data_addr, e);
    }
    drop(data);
    drop(payload);
    if let Err(e) = &sent {
        warn!("Payload transfer to {} incomplete: {}", data_addr, e);
    }

    // The acknowledgment is read whether or not the payload went out in full.
    let acknowledged = await_completion(control, peer).await;
    let bytes = sent?;
    Ok(SessionOutcome::Delivered {
        bytes,
        acknowledged,
    })
}

async fn transmit(data: &mut TcpStream, payload: &Payload) -> Result<usize, FtError> {
    send_header(data, payload).await?;
    let sent = send_all(data, payload.as_bytes()).await?;
    info!("Sent {} bytes over the data connection", sent);
    Ok(sent)
}

async fn reject(
    control: &mut TcpStream,
    peer: SocketAddr,
    err: ProtocolError,
) -> Result<SessionOutcome, FtError> {
    let response = error_to_response(&err);
    info!("Sending {} to {}", response.as_str(), peer);
    send_response(control, &response).await?;
    Ok(SessionOutcome::Rejected(err))
}

async fn send_response(control: &mut TcpStream, response: &Response) -> Result<(), FtError> {
    control.write_all(response.as_str().as_bytes()).await?;
    control.flush().await?;
    Ok(())
}

/// Waits for the client's `OK` on the control connection after a transfer.
async fn await_completion(control: &mut TcpStream, peer: SocketAddr) -> bool {
    let mut buffer = [0u8; 32];
    match control.read(&mut buffer).await {
        Ok(0) => {
            warn!("Client {} closed without acknowledging receipt", peer);
            false
        }
        Ok(n) => {
            let ack = Response::parse(&String::from_utf8_lossy(&buffer[..n]));
            info!("Acknowledgment of receipt from {}: {}", peer, ack.as_str());
            ack.is_ok()
        }
        Err(e) => {
            warn!("Failed to read acknowledgment from {}: {}", peer, e);
            false
        }
    }
}
