//! Error types
//!
//! Defines domain-specific error types for each module of the transfer service.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Per-request failures that are reported to the peer as a response literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    InvalidCommand,
    DirectoryReadFailed,
    FileNotFound,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidCommand => write!(f, "Invalid command"),
            ProtocolError::DirectoryReadFailed => write!(f, "Error reading directory"),
            ProtocolError::FileNotFound => write!(f, "File not found"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    NotAFile(String),
    PathTraversal(String),
    DirectoryUnreadable(io::Error),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a regular file: {}", p),
            StorageError::PathTraversal(p) => write!(f, "Path traversal attempt: {}", p),
            StorageError::DirectoryUnreadable(e) => write!(f, "Cannot read directory: {}", e),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Transfer module errors
#[derive(Debug)]
pub enum TransferError {
    ControlConnectFailed(String, io::Error),
    PortBindingFailed(SocketAddr, io::Error),
    AcceptFailed(io::Error),
    DataConnectionAbandoned,
    DataConnectFailed { addr: SocketAddr, attempts: u32, source: io::Error },
    EmptyResponse,
    Rejected(String),
    InvalidHeader(String),
    ShortTransfer { expected: usize, received: usize },
    IncompleteSend { expected: usize, sent: usize, source: io::Error },
    TransferFailed(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::ControlConnectFailed(addr, e) => {
                write!(f, "Failed to connect to {}: {}", addr, e)
            }
            TransferError::PortBindingFailed(addr, e) => {
                write!(f, "Failed to bind to {}: {}", addr, e)
            }
            TransferError::AcceptFailed(e) => write!(f, "Failed to accept data connection: {}", e),
            TransferError::DataConnectionAbandoned => write!(
                f,
                "Server closed the control connection without opening the data connection"
            ),
            TransferError::DataConnectFailed {
                addr,
                attempts,
                source,
            } => write!(
                f,
                "Failed to open data connection to {} after {} attempts: {}",
                addr, attempts, source
            ),
            TransferError::EmptyResponse => write!(f, "Server closed the control connection"),
            TransferError::Rejected(msg) => write!(f, "{}", msg),
            TransferError::InvalidHeader(h) => write!(f, "Invalid transfer header: {:?}", h),
            TransferError::ShortTransfer { expected, received } => write!(
                f,
                "Connection closed after {} of {} bytes",
                received, expected
            ),
            TransferError::IncompleteSend {
                expected,
                sent,
                source,
            } => write!(f, "Sent {} of {} bytes: {}", sent, expected, source),
            TransferError::TransferFailed(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::TransferFailed(error)
    }
}

/// Top-level error covering every failure surfaced to the binaries.
#[derive(Debug)]
pub enum FtError {
    Protocol(ProtocolError),
    Storage(StorageError),
    Transfer(TransferError),
    Config(config::ConfigError),
    Usage(String),
    IoError(io::Error),
}

impl fmt::Display for FtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtError::Protocol(e) => write!(f, "Protocol error: {}", e),
            FtError::Storage(e) => write!(f, "Storage error: {}", e),
            FtError::Transfer(e) => write!(f, "Transfer error: {}", e),
            FtError::Config(e) => write!(f, "Configuration error: {}", e),
            FtError::Usage(msg) => write!(f, "Usage error: {}", msg),
            FtError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FtError {}

impl From<ProtocolError> for FtError {
    fn from(error: ProtocolError) -> Self {
        FtError::Protocol(error)
    }
}

impl From<StorageError> for FtError {
    fn from(error: StorageError) -> Self {
        FtError::Storage(error)
    }
}

impl From<TransferError> for FtError {
    fn from(error: TransferError) -> Self {
        FtError::Transfer(error)
    }
}

impl From<config::ConfigError> for FtError {
    fn from(error: config::ConfigError) -> Self {
        FtError::Config(error)
    }
}

impl From<io::Error> for FtError {
    fn from(error: io::Error) -> Self {
        FtError::IoError(error)
    }
}
