//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only talks to the `log`
//! facade; binaries call [`init_logging`] once near the top of `main`.

mod init;

pub use init::{init_logging, LoggingConfig};
