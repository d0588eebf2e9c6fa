//! Logging setup.
//!
//! The engine logs through the `log` facade only; binaries install the
//! `env_logger` backend with [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};
