//! File system storage
//!
//! Serves directory listings and file contents from the configured root.

pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{EMPTY_LISTING, ResourceProvider};
pub use results::Payload;
pub use validation::resolve_within_root;
