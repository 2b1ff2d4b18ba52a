//! calfetch CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calfetch_client::cli::{Cli, Command, ConfigAction};
use calfetch_client::commands;
use calfetch_client::config::ClientConfig;
use calfetch_client::error::{ClientError, ClientResult};
use calfetch_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    if let Err(e) = init_tracing(TracingConfig::for_cli(cli.debug || config.debug, cli.json)) {
        eprintln!("warning: {}", e);
    }

    let server = config.server.clone().with_overrides(&cli);

    match cli.command {
        Command::List => commands::fetch::list(&server, cli.json).await,
        Command::Events { ref start, ref end } => {
            commands::fetch::events(&server, start.as_deref(), end.as_deref(), cli.json).await
        }
        Command::Config { ref action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&server),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
