//! CLI subcommand implementations.

pub mod batch;
pub mod check;
pub mod run;
pub mod trigger;
