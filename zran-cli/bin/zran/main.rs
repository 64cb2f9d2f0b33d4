//! Binary entry point for the `zran` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match zran_cli::process::main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zran: {err}");
            ExitCode::FAILURE
        }
    }
}
