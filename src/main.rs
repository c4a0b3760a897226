use chat_pager::cli::{init_logging, parse_args, run_cli_command, run_demo, CliCommand};
use chat_pager::config::PagerConfig;

use color_eyre::Result;

fn main() -> Result<()> {
    let command = parse_args(std::env::args());
    if let Some(result) = run_cli_command(&command) {
        return result;
    }
    let jump = match command {
        CliCommand::Run { jump } => jump,
        _ => None,
    };

    color_eyre::install()?;
    init_logging();

    let config = PagerConfig::from_env()?;
    tracing::info!(
        initial = config.initial_load_count,
        pagination = config.pagination_load_count,
        target = jump.unwrap_or(config.target_message_id),
        latency_ms = config.fetch_latency_ms,
        "Starting pager demo"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(run_demo(config, jump))?;

    println!("{}", summary);
    Ok(())
}
