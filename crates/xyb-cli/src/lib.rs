//! Attendance client CLI library.
//!
//! This crate provides the CLI interface for the attendance client.

mod cli;
pub mod commands;
mod config;
pub mod logging;

pub use cli::{Cli, Commands};
pub use config::Config;
