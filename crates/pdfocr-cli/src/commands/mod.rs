//! CLI subcommands.

pub mod config;
pub mod process;
pub mod tools;
