//! Dispatches a parsed [`Command`] to its handler in [`crate::operations`].

use std::io::{self, Write};

use crate::config::{Cli, Command};
use crate::error::Result;
use crate::operations;

/// Run the parsed CLI invocation, writing subcommand output to `out`.
///
/// # Errors
///
/// Returns an error if the input file or index file cannot be opened, or if
/// the engine reports a decode/validation failure, surfaced through
/// [`zran_core::Error`].
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::BuildIndex {
            input,
            output,
            index_opts,
        } => {
            let summary = operations::build_index(&input, output.as_deref(), index_opts.to_engine_options())?;
            writeln!(out, "{summary}").ok();
        }
        Command::SeekPoints {
            input,
            index,
            index_opts,
        } => {
            let points =
                operations::seek_points(&input, index.as_deref(), index_opts.to_engine_options())?;
            for (compressed, uncompressed) in points {
                writeln!(out, "{compressed}\t{uncompressed}").ok();
            }
        }
        Command::Pread {
            input,
            offset,
            length,
            index,
            index_opts,
        } => {
            operations::pread(
                &input,
                offset,
                length,
                index.as_deref(),
                index_opts.to_engine_options(),
                out,
            )?;
        }
        Command::Cat { input, index_opts } => {
            operations::cat(&input, index_opts.to_engine_options(), out)?;
        }
    }
    Ok(())
}

/// Entry point called from `bin/zran/main.rs`: parses `argv`, runs the
/// command against stdout, and maps errors onto a process exit code the way
/// `gzip-utils::run_cli` does for its own binaries.
pub fn main() -> io::Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    run(cli, &mut lock).map_err(io::Error::from)
}
