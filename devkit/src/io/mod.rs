//! I/O helpers: git queries, bounded child processes, configuration.

pub mod changes;
pub mod config;
pub mod git;
pub mod process;
