use std::net::SocketAddr;
use std::time::Duration;

use argh::FromArgs;
use dotenv::dotenv;
use miette::{Diagnostic, IntoDiagnostic, Result};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api;
use crate::integrations::upstream::{
    FetchError, Fetcher, UpstreamConfig, API_KEY_ENV, API_URL_ENV,
};

pub struct App {
    args: Args,
}

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error("required environment variable {name} is not set, required for {purpose}")]
    #[diagnostic(code(finproxy::error::env))]
    MissingEnvironmentVariable { name: String, purpose: String },
    #[error("upstream configuration error: {0}")]
    #[diagnostic(code(finproxy::error::configuration))]
    ConfigurationError(#[from] FetchError),
}

impl App {
    pub fn new() -> Self {
        Self::with_args(argh::from_env())
    }

    pub fn with_args(args: Args) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<()> {
        dotenv().ok();

        miette::set_panic_hook();

        if std::env::var_os("RUST_BACKTRACE").is_none() {
            std::env::set_var("RUST_BACKTRACE", "1")
        }

        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "finproxy_server=debug,tower_http=debug")
        }

        if self.args.json {
            tracing_subscriber::fmt::fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init()
                .ok();
        } else {
            tracing_subscriber::fmt::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init()
                .ok();
        }

        let config = self.upstream_config()?;
        let fetcher = Fetcher::new(&config).map_err(AppError::ConfigurationError)?;

        tracing::debug!(
            url = config.masked_url().as_str(),
            timeout_secs = config.timeout.map(|t| t.as_secs()),
            "using upstream"
        );

        let router = api::build(fetcher);

        tracing::debug!(
            ip = self.args.listen_address.ip().to_string().as_str(),
            port = self.args.listen_address.port(),
            url = format!(
                "http://{}:{}",
                self.args.listen_address.ip(),
                self.args.listen_address.port()
            ),
            "server started"
        );

        let server = axum::Server::bind(&self.args.listen_address)
            .serve(router.into_make_service_with_connect_info::<SocketAddr>());

        let graceful = server.with_graceful_shutdown(shutdown_signal());
        graceful.await.into_diagnostic()?;

        tracing::debug!("server terminated");

        Ok(())
    }

    fn upstream_config(&self) -> Result<UpstreamConfig, AppError> {
        let base_url = match &self.args.api_url {
            Some(url) => url.clone(),
            None => env_or_error(API_URL_ENV, "upstream requests")?,
        };
        let api_key = match &self.args.api_key {
            Some(key) => key.clone(),
            None => env_or_error(API_KEY_ENV, "upstream authentication")?,
        };

        let config = UpstreamConfig::new(base_url, api_key);
        Ok(match self.args.upstream_timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to handle Ctrl-C signal: {}", e);
        return;
    }
    tracing::info!("ctrl-c received");
}

#[derive(FromArgs)]
/// Filtering proxy in front of an upstream financial data API.
pub struct Args {
    /// server address:port to listen on (default: 0.0.0.0:5000, PORT environment variable can override default port 5000)
    #[argh(
        option,
        default = "SocketAddr::from(([0, 0, 0, 0], default_listen_port()))"
    )]
    pub listen_address: SocketAddr,
    /// upstream URL the API key is appended to (default: API_URL environment variable)
    #[argh(option)]
    pub api_url: Option<String>,
    /// upstream API key (default: API_KEY environment variable)
    #[argh(option)]
    pub api_key: Option<String>,
    /// give up on upstream requests after this many seconds (default: wait indefinitely)
    #[argh(option)]
    pub upstream_timeout_secs: Option<u64>,
    /// use JSON for log messages
    #[argh(switch)]
    pub json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([127, 0, 0, 1], default_listen_port())),
            api_url: None,
            api_key: None,
            upstream_timeout_secs: None,
            json: false,
        }
    }
}

const DEFAULT_LISTEN_PORT: u16 = 5000;

fn default_listen_port() -> u16 {
    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse() {
            tracing::debug!("using port from PORT environment variable");
            port
        } else {
            DEFAULT_LISTEN_PORT
        }
    } else {
        DEFAULT_LISTEN_PORT
    }
}

fn env_or_error(name: &str, purpose: &str) -> Result<String, AppError> {
    if let Ok(value) = std::env::var(name) {
        Ok(value)
    } else {
        Err(AppError::MissingEnvironmentVariable {
            name: name.to_string(),
            purpose: purpose.to_string(),
        })
    }
}
