mod cli;
mod logic;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction, ConsoleArgs};
use logic::client::gateway::ActionGateway;
use logic::client::transport::HttpTransport;
use logic::client::url_utils::build_api_url;
use logic::client::{command, list};
use logic::config::{ConsoleConfig, ConsoleOverrides};
use std::rc::Rc;
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command‐line arguments
    let args = Cli::parse();

    // Logs go to stderr so they never tear the console screen on stdout
    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Allow BROKERDECK_HOST / BROKERDECK_PORT to override flags
    let host = std::env::var("BROKERDECK_HOST").unwrap_or_else(|_| args.host.clone());
    let port = std::env::var("BROKERDECK_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(args.port);
    let root = build_api_url(args.base_url.as_deref(), &host, port, "");

    let config = ConsoleConfig::load(args.config.as_deref())?;

    let gateway = |config: &ConsoleConfig| -> anyhow::Result<ActionGateway> {
        Ok(ActionGateway::new(Rc::new(HttpTransport::new(root.clone(), config.request_timeout())?)))
    };

    // Dispatch on subcommand
    match args.command.unwrap_or_else(|| Commands::Console(ConsoleArgs::default())) {
        Commands::Console(overrides) => {
            let config = config.with_overrides(&ConsoleOverrides {
                data_refresh_ms: overrides.data_refresh_ms,
                terminal_refresh_ms: overrides.terminal_refresh_ms,
                live_window: overrides.live_window,
                download_dir: overrides.download_dir,
            })?;
            LocalSet::new().run_until(logic::console::run(config, root.clone())).await?
        }
        Commands::Brokers { format } => list::brokers(&gateway(&config)?, format).await?,
        Commands::Points {
            limit,
            format,
            watch,
            interval,
        } => list::points(&gateway(&config)?, limit, format, watch, interval).await?,
        Commands::Logs => command::logs(&gateway(&config)?).await?,
        Commands::Command { text } => {
            command::run(&gateway(&config)?, &text.join(" "), config.command_refresh_delay()).await?
        }
        Commands::ExportSql { output } => command::export_sql(&gateway(&config)?, output.as_deref()).await?,
        Commands::Config { action: ConfigAction::Show } => {
            println!("# service: {}", root);
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
