//! Control responses
//!
//! The literal status strings exchanged on the control connection.

pub const OK: &str = "OK";
pub const INVALID_COMMAND: &str = "INVALID COMMAND";
pub const ERROR_READING_DIRECTORY: &str = "ERROR READING DIRECTORY";
pub const FILE_NOT_FOUND: &str = "FILE NOT FOUND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok,
    InvalidCommand,
    DirectoryReadFailed,
    FileNotFound,
    /// Text that matches none of the known literals, kept verbatim.
    Other(String),
}

impl Response {
    pub fn as_str(&self) -> &str {
        match self {
            Response::Ok => OK,
            Response::InvalidCommand => INVALID_COMMAND,
            Response::DirectoryReadFailed => ERROR_READING_DIRECTORY,
            Response::FileNotFound => FILE_NOT_FOUND,
            Response::Other(text) => text,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim_matches(|c: char| c == '\0' || c.is_whitespace()) {
            OK => Response::Ok,
            INVALID_COMMAND => Response::InvalidCommand,
            ERROR_READING_DIRECTORY => Response::DirectoryReadFailed,
            FILE_NOT_FOUND => Response::FileNotFound,
            other => Response::Other(other.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok)
    }
}
