//! Error types for the `zran` CLI.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Specialized `Result` type for `zran-cli` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the CLI's subcommand handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to open the input file.
    #[error("{}: {source}", path.display())]
    OpenInput {
        /// Path to the input file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to open or create the index file.
    #[error("{}: {source}", path.display())]
    IndexFile {
        /// Path to the index file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The engine reported an error building or querying the index.
    #[error(transparent)]
    Engine(#[from] zran_core::Error),

    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::OpenInput { source, .. }
            | Error::IndexFile { source, .. }
            | Error::WriteOutput(source) => source.kind(),
            Error::Engine(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
