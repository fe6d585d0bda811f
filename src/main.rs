mod cli;
mod spinner;

use crate::cli::{Cli, Command};
use crate::spinner::Spinner;
use clap::Parser;
use derive_more::{Display, Error};
use exn::ResultExt;
use inpxer_config::Config;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("import failed")]
    Import,
}

type Result<T> = std::result::Result<T, exn::Exn<ErrorKind>>;

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Configuration loaded");
    match cli.command {
        Command::Import(args) => {
            let mut spinner = Spinner::new();
            let summary = inpxer_indexer::run(&config, &args.archive, args.options(), &mut spinner)
                .await
                .or_raise(|| ErrorKind::Import)?;
            println!("{summary}");
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}
