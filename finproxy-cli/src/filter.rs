use std::io::{self, Read, Write};

use argh::FromArgs;
use camino::Utf8PathBuf;
use finproxy_core::{Query, Record};

use crate::CliError;

/// Filter a JSON array of financial records the same way the server does.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "filter")]
pub struct FilterCommand {
    /// path to a JSON file with the records (default: read from stdin)
    #[argh(positional)]
    input: Option<Utf8PathBuf>,
    /// earliest date to keep, inclusive
    #[argh(option)]
    start_date: Option<String>,
    /// latest date to keep, inclusive
    #[argh(option)]
    end_date: Option<String>,
    /// smallest revenue to keep, inclusive
    #[argh(option)]
    min_revenue: Option<i64>,
    /// largest revenue to keep, inclusive
    #[argh(option)]
    max_revenue: Option<i64>,
    /// smallest net income to keep, inclusive
    #[argh(option)]
    min_net_income: Option<i64>,
    /// largest net income to keep, inclusive
    #[argh(option)]
    max_net_income: Option<i64>,
    /// pretty-print the output
    #[argh(switch)]
    pretty: bool,
}

impl FilterCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        let json = self.read_input()?;
        let mut stdout = io::stdout().lock();
        self.write_filtered(&json, &mut stdout)
    }

    fn read_input(&self) -> Result<String, CliError> {
        match &self.input {
            Some(path) => {
                tracing::info!("reading records from {}", path);
                Ok(std::fs::read_to_string(path)?)
            }
            None => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
        }
    }

    fn write_filtered<W: Write>(&self, json: &str, out: &mut W) -> Result<(), CliError> {
        let records: Vec<Record> = serde_json::from_str(json)?;
        let total = records.len();
        let filtered = finproxy_core::apply(records, &self.query())?;

        tracing::info!("kept {} of {} record(s)", filtered.len(), total);

        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &filtered)?;
        } else {
            serde_json::to_writer(&mut *out, &filtered)?;
        }
        writeln!(out)?;

        Ok(())
    }

    fn query(&self) -> Query {
        Query {
            start_date: self.start_date.clone().filter(|d| !d.is_empty()),
            end_date: self.end_date.clone().filter(|d| !d.is_empty()),
            min_revenue: self.min_revenue,
            max_revenue: self.max_revenue,
            min_net_income: self.min_net_income,
            max_net_income: self.max_net_income,
        }
    }
}
