//! calgate CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calgate_client::cli::{Cli, Command, ConfigAction};
use calgate_client::commands;
use calgate_client::error::{ClientError, ClientResult};
use calgate_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ClientError::Rejected(rejection)) => {
            // The body a transport would send back, for scripting.
            match serde_json::to_string(&rejection) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("error: {}", rejection.message),
            }
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    init_tracing(tracing)?;

    match cli.command {
        Command::Tools { json } => commands::tools::list(json),
        Command::Call {
            tool,
            args,
            authorization,
        } => commands::call::run(&tool, &args, authorization.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Show => commands::config::show(),
            ConfigAction::Validate => commands::config::validate(),
        },
    }
}
