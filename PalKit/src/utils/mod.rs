//! Utility functions

pub mod process;

pub use process::{ToolOutput, ToolRun, run_tool};
