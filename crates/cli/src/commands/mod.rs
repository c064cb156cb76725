//! Command handlers for the poliqa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod build;
pub mod clean;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use build::BuildCommand;
pub use clean::CleanCommand;
pub use stats::StatsCommand;
