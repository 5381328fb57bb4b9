//! Offering upload binary.
//!
//! Reads a JSON upload request (an array of offering items), stores it in one
//! transaction and prints the report.
//!
//! # Usage
//!
//! ```bash
//! offering-upload payload.json --db offering.db
//! offering-upload payload.json --config offering.json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (default: info)

use std::path::PathBuf;

use anyhow::{bail, Context};
use offering_core::Config;
use offering_ingestion::{parse_payload, SubmissionProcessor};
use offering_store::SqliteStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: offering-upload <payload.json> [--db <path>] [--config <config.json>]";

#[derive(Debug, PartialEq)]
struct Args {
    payload: PathBuf,
    database: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut payload = None;
        let mut database = None;
        let mut config = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => database = Some(args.next().context("--db needs a path")?.into()),
                "--config" => config = Some(args.next().context("--config needs a path")?.into()),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ if payload.is_none() => payload = Some(PathBuf::from(&arg)),
                _ => bail!("unexpected argument {arg}\n{USAGE}"),
            }
        }

        Ok(Self {
            payload: payload.context(USAGE)?,
            database,
            config,
        })
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if args.database.is_some() {
        config.store.database_path = args.database;
    }

    let json = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("reading payload {}", args.payload.display()))?;
    let items = parse_payload(&json)?;
    info!(items = items.len(), timezone = %config.trading.timezone, "uploading offering payload");

    let processor = SubmissionProcessor::from_config(&config)?;
    let mut store = SqliteStore::from_config(&config)?;
    let report = processor.process(&mut store, &items)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    if let Err(err) = run(args) {
        error!(error = %err, "offering upload failed");
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_payload_only() {
        let args = parse(&["payload.json"]).unwrap();
        assert_eq!(args.payload, PathBuf::from("payload.json"));
        assert!(args.database.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let args = parse(&["--db", "o.db", "payload.json", "--config", "c.json"]).unwrap();
        assert_eq!(
            args,
            Args {
                payload: "payload.json".into(),
                database: Some("o.db".into()),
                config: Some("c.json".into()),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
        assert!(parse(&["a.json", "--db"]).is_err());
        assert!(parse(&["a.json", "--verbose"]).is_err());
    }
}
