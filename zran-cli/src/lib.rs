//! Library half of the `zran` command-line front-end.
//!
//! Keeping the subcommand logic in a library crate (rather than only in
//! `bin/zran/main.rs`) lets the integration tests under `tests/` drive
//! [`process::run`] directly against an in-memory buffer instead of
//! spawning the compiled binary for every case.

pub mod config;
pub mod error;
pub mod operations;
pub mod process;

pub use config::{Cli, Command, IndexOpts};
pub use error::{Error, Result};
