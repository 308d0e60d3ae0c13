//! Server core functionality
//!
//! The sequential accept loop and the per-connection request cycle.

pub mod core;
pub mod session;

pub use self::core::Server;
pub use session::{SessionOutcome, handle_control_connection};
