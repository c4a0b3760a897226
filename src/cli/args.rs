//! Command-line argument parsing for the pager demo.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Run the headless demo, optionally jumping to a specific id
    Run { jump: Option<i64> },
    /// Arguments could not be parsed
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// The first item is the program name and is skipped.
///
/// # Examples
///
/// ```
/// use chat_pager::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chat-pager".to_string(), "--jump".to_string(), "42".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Run { jump: Some(42) });
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut jump = None;
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--jump" | "-j" => match args.next() {
                Some(value) => match value.parse::<i64>() {
                    Ok(id) => jump = Some(id),
                    Err(_) => {
                        return CliCommand::Invalid(format!("--jump expects a message id, got '{}'", value))
                    }
                },
                None => return CliCommand::Invalid("--jump expects a message id".to_string()),
            },
            other => {
                if let Some(value) = other.strip_prefix("--jump=") {
                    match value.parse::<i64>() {
                        Ok(id) => jump = Some(id),
                        Err(_) => {
                            return CliCommand::Invalid(format!(
                                "--jump expects a message id, got '{}'",
                                value
                            ))
                        }
                    }
                } else {
                    return CliCommand::Invalid(format!("unknown argument '{}'", other));
                }
            }
        }
    }

    CliCommand::Run { jump }
}
