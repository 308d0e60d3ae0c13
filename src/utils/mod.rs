//! Utility functions
//!
//! Logging setup and command-line validation shared by the binaries.

pub mod logging;
pub mod validation;
