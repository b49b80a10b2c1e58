use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use pluginbot::application::errors::{BotError, ConfigError};
use pluginbot::application::services::BotHost;
use pluginbot::infrastructure::adapters::{ConsoleTransport, TelegramTransport};
use pluginbot::infrastructure::config::{Config, SETTINGS_FILENAME};
use pluginbot::infrastructure::signals;
use pluginbot::plugins::BuiltinCatalog;

#[derive(Parser)]
#[command(name = "pluginbot")]
#[command(about = "A chat bot host driven by directory-loaded plugins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file path
    #[arg(short, long, default_value = SETTINGS_FILENAME, global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Bot token (overrides settings and BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,

        /// Read messages from stdin instead of connecting to Telegram
        #[arg(long)]
        console: bool,
    },
    /// Show version
    Version,
    /// Generate default settings
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token, console } => run_bot(&cli.config, token, console),
        Commands::Version => {
            println!("pluginbot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(&cli.config),
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, BotError> {
    let mut config = Config::load(config_path)?.with_env();
    if let Some(token) = token_override {
        config.token = token;
    }
    Ok(config)
}

fn run_bot(config_path: &str, token_override: Option<String>, console: bool) -> ExitCode {
    let config = match load_config(config_path, token_override) {
        Ok(config) => config,
        Err(BotError::Config(e @ ConfigError::Unavailable { .. })) => {
            tracing::error!("{}, program will automatically try to create one.", e);
            if let Err(e) = Config::write_default(config_path) {
                tracing::error!("Failed to create {}: {}", config_path, e);
            } else {
                tracing::info!("Created {}, fill in the token and restart", config_path);
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting {}", config.name);

    let host = match BotHost::start(&config, BuiltinCatalog::bundled()) {
        Ok(host) => host,
        Err(e) => {
            tracing::error!("Failed to load plugins: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = rt.block_on(async {
        if console || !config.has_token() {
            let transport = Arc::new(ConsoleTransport::new(&config.name));
            host.serve(transport, signals::wait_for_termination()).await
        } else {
            let transport = Arc::new(TelegramTransport::new(&config.token));
            host.serve(transport, signals::wait_for_termination()).await
        }
    });

    ExitCode::from(code)
}

fn init_config(config_path: &str) -> ExitCode {
    match Config::write_default(config_path) {
        Ok(backup) => {
            if let Some(backup) = backup {
                println!("Moved existing settings to {}", backup.display());
            }
            println!("Created {}", Path::new(config_path).display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to create {}: {}", config_path, e);
            ExitCode::FAILURE
        }
    }
}
