//! Control protocol
//!
//! Handles request parsing and the response literals of the control connection.

pub mod commands;
pub mod parser;
pub mod responses;

pub use commands::{Operation, Request};
pub use parser::parse_request;
pub use responses::Response;
