use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use answer_core::TrackerSettings;
use answer_engine::ClientSettings;
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;

use crate::logging::LogDestination;

const DEFAULT_CONFIG_FILENAME: &str = "answer_cli.ron";

#[derive(Debug, Parser)]
#[command(name = "answer_cli", about = "Ask questions about a page and watch the answers arrive")]
pub struct Args {
    /// RON config file. Defaults to ./answer_cli.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the answer server.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Page whose sources the questions are about.
    #[arg(long)]
    pub page_id: Option<String>,
    /// Where log output goes. Defaults to ./answer_cli.log.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}

/// Contents of the optional config file. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub page_id: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub stale_timeout_ms: Option<u64>,
    pub type_speed_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub log: Option<LogDestination>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub tracker: TrackerSettings,
    pub client: ClientSettings,
    pub page_id: Option<String>,
    pub log: LogDestination,
    pub log_level: LevelFilter,
}

/// Reads the config file. A missing default file is not an error.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<CliConfig> {
    let path = explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME), Path::to_path_buf);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(CliConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };
    ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Layers command-line flags over the file, and the file over the defaults.
pub fn resolve(args: &Args, file: CliConfig) -> ResolvedConfig {
    let tracker_defaults = TrackerSettings::default();
    let client_defaults = ClientSettings::default();
    let millis = |value: Option<u64>, default: Duration| value.map_or(default, Duration::from_millis);

    ResolvedConfig {
        tracker: TrackerSettings {
            poll_interval: millis(file.poll_interval_ms, tracker_defaults.poll_interval),
            stale_timeout: millis(file.stale_timeout_ms, tracker_defaults.stale_timeout),
            type_speed: millis(file.type_speed_ms, tracker_defaults.type_speed),
        },
        client: ClientSettings {
            base_url: args
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or(client_defaults.base_url),
            connect_timeout: millis(file.connect_timeout_ms, client_defaults.connect_timeout),
            request_timeout: millis(file.request_timeout_ms, client_defaults.request_timeout),
        },
        page_id: args.page_id.clone().or(file.page_id),
        log: args.log.or(file.log).unwrap_or_default(),
        log_level: file
            .log_level
            .as_deref()
            .and_then(answer_logging::parse_level)
            .unwrap_or(LevelFilter::Info),
    }
}
