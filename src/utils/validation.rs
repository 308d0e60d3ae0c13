//! Input validation utilities
//!
//! Checks on user supplied command-line values.

use log::warn;

use crate::error::FtError;

pub const MIN_PORT: u16 = 1024;
pub const RECOMMENDED_MIN_PORT: u16 = 50000;

/// Accepts ports 1024..=65535, warning about anything below 50000.
pub fn validate_port(port: u16) -> Result<u16, FtError> {
    if port < MIN_PORT {
        return Err(FtError::Usage(format!(
            "invalid port {}: use a port between {} and 65535",
            port, MIN_PORT
        )));
    }

    if port < RECOMMENDED_MIN_PORT {
        warn!(
            "Port {} is below {}; a higher port is recommended",
            port, RECOMMENDED_MIN_PORT
        );
    }

    Ok(port)
}
