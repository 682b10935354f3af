//! CLI module for PredictBuddy
//!
//! Argument parsing and input loading for the `predictbuddy` binary.

pub mod args;
pub mod input;

pub use args::{Args, Commands, Verbosity};
pub use input::{load_context, load_input};
