//! Transfer module
//!
//! Data connection setup, the length-prefixed payload transfer, and saving
//! received files.

pub mod data_channel;
pub mod file_ops;
pub mod save;

// Re-export key types and functions
pub use data_channel::{accept_data_stream, bind_data_listener, connect_data_stream};
pub use file_ops::{encode_header, read_header, receive_payload, send_all, send_header};
pub use save::save_with_dedup;
