//! Turnstile CLI entry point.

use clap::Parser;

use turnstile::cli::{commands, handle_error, load_config, Cli, Commands};
use turnstile::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // init must work before any configuration exists
    if let Commands::Init(args) = cli.command {
        let _logger = LoggerImpl::init(&LogConfig::default());
        if let Err(err) = commands::init::execute(args, cli.json).await {
            handle_error(err, cli.json);
        }
        return;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Chat(args) => commands::chat::execute(args, &config, cli.json).await,
        Commands::Ask(args) => commands::ask::execute(args, &config, cli.json).await,
        Commands::History(args) => commands::history::execute(args, &config, cli.json).await,
        Commands::Health => commands::health::execute(&config, cli.json).await,
        Commands::Init(_) => Ok(()),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
