//! `stockcast` command-line entry points.
//!
//! Every command loads an inventory snapshot, wires it to the forecast
//! engine with a file-backed artifact store, and returns a JSON report.

mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{Report, execute};
