//! CLI entry point for jobcli.

use std::process::ExitCode;

mod app;
mod cli;
mod commands;

/// Final process outcome, mapped to an exit code in `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    /// Every selected source failed and nothing was found.
    Failure,
}

impl ProcessExit {
    fn code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_jobcli().await {
        Ok(exit) => exit.code(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}
