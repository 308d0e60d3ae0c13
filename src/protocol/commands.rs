//! Module `commands`
//!
//! Defines the requests a client can make over the control connection.

use std::fmt;

/// Flag selecting a directory listing.
pub const LIST_FLAG: &str = "-l";
/// Flag selecting a file download.
pub const GET_FLAG: &str = "-g";

/// The resource a client asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Get(String), // Filename relative to the served root
}

impl Operation {
    pub fn flag(&self) -> &'static str {
        match self {
            Operation::List => LIST_FLAG,
            Operation::Get(_) => GET_FLAG,
        }
    }
}

/// A parsed control request: what to send and where the client is listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub data_port: u16,
}

impl Request {
    pub fn new(operation: Operation, data_port: u16) -> Self {
        Self {
            operation,
            data_port,
        }
    }
}

/// Formats the request in its wire form: `<flag> [<filename>] <dataPort>`.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.operation.flag())?;
        if let Operation::Get(name) = &self.operation {
            write!(f, "{} ", name)?;
        }
        write!(f, "{}", self.data_port)
    }
}
