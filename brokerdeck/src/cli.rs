use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// terminal control surface for an MQTT broker-management service
#[derive(Parser)]
#[command(name = "brokerdeck", version)]
pub struct Cli {
    /// Management service host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Management service port
    #[arg(short, long, default_value_t = 80)]
    pub port: u16,

    /// Full service URL (e.g. https://mqtt.example.com/app); overrides host and port
    #[arg(long, env = "BROKERDECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file (supports `~`)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log filter for stderr, e.g. `debug` or `brokerdeck=trace` (falls back to RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive console (default)
    Console(ConsoleArgs),

    /// List brokers known to the service
    Brokers {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List the most recent data points, newest first
    Points {
        /// How many points to fetch
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
        /// Watch mode: continuously update the listing
        #[arg(short, long)]
        watch: bool,
        /// Watch interval in seconds (default: 5)
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },

    /// Print the service's terminal log
    Logs,

    /// Send one terminal command and print the log afterwards
    Command {
        #[arg(value_name = "COMMAND", required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Generate the SQL export
    ExportSql {
        /// Write to a file instead of stdout (supports `~`)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Default)]
pub struct ConsoleArgs {
    /// Data table refresh interval in milliseconds (overrides config file)
    #[arg(long)]
    pub data_refresh_ms: Option<u64>,
    /// Terminal log refresh interval in milliseconds (overrides config file)
    #[arg(long)]
    pub terminal_refresh_ms: Option<u64>,
    /// Data points shown in the live table (overrides config file)
    #[arg(long)]
    pub live_window: Option<usize>,
    /// Directory for JSON downloads (supports `~`)
    #[arg(long)]
    pub download_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_is_the_default() {
        let cli = Cli::try_parse_from(["brokerdeck"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.port, 80);
        assert_eq!(cli.host, "127.0.0.1");
    }

    #[test]
    fn test_command_words_are_collected() {
        let cli = Cli::try_parse_from(["brokerdeck", "-p", "5000", "command", "connect", "plant"]).unwrap();
        assert_eq!(cli.port, 5000);
        match cli.command {
            Some(Commands::Command { text }) => assert_eq!(text.join(" "), "connect plant"),
            _ => panic!("expected command"),
        }
    }

    #[test]
    fn test_console_overrides() {
        let cli = Cli::try_parse_from(["brokerdeck", "console", "--live-window", "20"]).unwrap();
        match cli.command {
            Some(Commands::Console(args)) => assert_eq!(args.live_window, Some(20)),
            _ => panic!("expected console"),
        }
    }
}
