//! Control request parsing
//!
//! Turns a raw command line received from a client into a [`Request`].

use crate::error::ProtocolError;
use crate::protocol::commands::{GET_FLAG, LIST_FLAG, Operation, Request};

/// Parses `-l <port>` or `-g <filename> <port>`.
///
/// Tokens past the data port are ignored. Filenames are passed through
/// untouched; confinement to the served root happens in storage.
pub fn parse_request(raw: &str) -> Result<Request, ProtocolError> {
    let trimmed = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let mut tokens = trimmed.split_whitespace();

    let operation = match tokens.next() {
        Some(LIST_FLAG) => Operation::List,
        Some(GET_FLAG) => {
            let filename = tokens.next().ok_or(ProtocolError::InvalidCommand)?;
            Operation::Get(filename.to_string())
        }
        _ => return Err(ProtocolError::InvalidCommand),
    };

    let data_port = tokens
        .next()
        .and_then(|port| port.parse::<u16>().ok())
        .ok_or(ProtocolError::InvalidCommand)?;

    Ok(Request::new(operation, data_port))
}
