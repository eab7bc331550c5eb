//! Brickwire CLI library
//!
//! Encodes and decodes hub frames and runs the full link lifecycle against
//! the in-memory loopback transport.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
