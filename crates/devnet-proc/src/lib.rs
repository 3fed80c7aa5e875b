//! Process supervision for the devnet launcher
//!
//! This crate runs the external tooling the devnet pipeline depends on:
//! - Synchronous command execution with environment overlays, captured
//!   output, and enforced timeouts
//! - Isolated worker processes whose failures are serialized back to the
//!   orchestrator instead of corrupting it
//! - A bounded pool of concurrent command presets with per-line annotated
//!   output

pub mod command;
pub mod error;
pub mod runner;
pub mod supervisor;

pub use command::{run_command, run_command_output, CommandSpec};
pub use error::ProcessError;
pub use runner::{run_presets, CommandPreset};
pub use supervisor::run_isolated;
