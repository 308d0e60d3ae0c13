pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use client::{Client, Delivery};
pub use self::config::Settings;
pub use error::FtError;
pub use server::Server;
