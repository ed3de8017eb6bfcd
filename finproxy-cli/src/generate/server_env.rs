use std::fs;

use argh::FromArgs;
use camino::Utf8PathBuf;

use crate::CliError;

const API_URL_ENV: &str = "API_URL";
const API_KEY_ENV: &str = "API_KEY";

/// Generate a .env file containing the upstream URL and API key for the server.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "server-env")]
pub struct GenerateServerEnv {
    /// path to env file to create (default: server.env in current directory)
    #[argh(positional, default = "Utf8PathBuf::from(\"server.env\")")]
    file_name: Utf8PathBuf,
    /// upstream URL the API key is appended to
    #[argh(option)]
    api_url: String,
    /// upstream API key
    #[argh(option)]
    api_key: String,
}

impl GenerateServerEnv {
    pub async fn run(&self) -> Result<(), CliError> {
        let mut dot_env = String::new();
        dot_env.push_str(&env_line(API_URL_ENV, &self.api_url));
        dot_env.push_str(&env_line(API_KEY_ENV, &self.api_key));

        tracing::info!("saving to {}", self.file_name);

        fs::write(&self.file_name, dot_env)?;

        Ok(())
    }
}

fn env_line(name: &str, value: &str) -> String {
    let mut line = String::new();
    line.push_str(name);
    line.push('=');
    line.push_str(&shell_quote(value));
    line.push('\n');
    line
}

fn shell_quote(value: &str) -> String {
    if value.contains('\n')
        || value.contains('\t')
        || value.contains('\r')
        || value.contains('\'')
    {
        // double quote
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
                .replace('\t', "\\t")
                .replace('\r', "\\r")
        )
    } else {
        // single quote
        format!("'{}'", value)
    }
}
