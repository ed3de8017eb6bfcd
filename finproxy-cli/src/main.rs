use argh::FromArgs;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod filter;
mod generate;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    JSONSerializationError(#[from] serde_json::Error),
    #[error("filter error: {0}")]
    FilterError(#[from] finproxy_core::Error),
}

/// Command-line interface for finproxy operations tasks.
#[derive(FromArgs, PartialEq, Eq, Debug)]
pub struct Arguments {
    #[argh(subcommand)]
    command: RootCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum RootCommand {
    Filter(filter::FilterCommand),
    Generate(generate::GenerateCommand),
}

impl RootCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        match self {
            RootCommand::Filter(cmd) => cmd.run().await,
            RootCommand::Generate(cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1")
    }

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "fincli=info,finproxy_core=info")
    }

    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Arguments = argh::from_env();
    if let Err(e) = args.command.run().await {
        tracing::error!("command failed: {:?}", e);
        std::process::exit(1);
    }
}
