//! Client side of the transfer protocol
//!
//! A single-shot request: listing or file download.

pub mod session;

pub use session::{Client, Delivery};
