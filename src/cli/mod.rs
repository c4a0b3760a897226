//! CLI module for the pager demo binary.
//!
//! - Argument parsing
//! - Version and usage text
//! - Log subscriber setup
//! - The headless demo run
//!
//! # Usage
//!
//! ```ignore
//! use chat_pager::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! if let Some(result) = run_cli_command(&command) {
//!     return result;
//! }
//! // No CLI-only command, run the demo
//! ```

pub mod args;
pub mod demo;
pub mod logging;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use demo::{run_demo, DemoSummary};
pub use logging::init_logging;
pub use version::{usage, version_line, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Run a CLI-only command if applicable.
///
/// # Returns
///
/// * `None` - If the command is `Run` (the caller starts the demo)
/// * `Some(Ok(()))` - If version or help was printed
/// * `Some(Err(e))` - If the arguments were invalid
pub fn run_cli_command(command: &CliCommand) -> Option<Result<()>> {
    match command {
        CliCommand::Version => {
            println!("{}", version_line());
            Some(Ok(()))
        }
        CliCommand::Help => {
            println!("{}", usage());
            Some(Ok(()))
        }
        CliCommand::Invalid(message) => Some(Err(eyre!("{}\n\n{}", message, usage()))),
        CliCommand::Run { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_none() {
        assert!(run_cli_command(&CliCommand::Run { jump: None }).is_none());
    }

    #[test]
    fn test_invalid_is_error() {
        let result = run_cli_command(&CliCommand::Invalid("bad".to_string()));
        assert!(matches!(result, Some(Err(_))));
    }

    #[test]
    fn test_version_handled() {
        assert!(matches!(run_cli_command(&CliCommand::Version), Some(Ok(()))));
    }
}
