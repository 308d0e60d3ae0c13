//! Error handlers
//!
//! Maps errors onto the literal responses sent over the control connection.

use crate::error::types::{FtError, ProtocolError};
use crate::protocol::Response;
use log::error;

/// Log an error that ends the current request cycle.
pub fn handle_error(err: &FtError) {
    error!("Request failed: {}", err);
}

/// Convert a per-request failure into the response literal sent to the client.
pub fn error_to_response(err: &ProtocolError) -> Response {
    match err {
        ProtocolError::InvalidCommand => Response::InvalidCommand,
        ProtocolError::DirectoryReadFailed => Response::DirectoryReadFailed,
        ProtocolError::FileNotFound => Response::FileNotFound,
    }
}
