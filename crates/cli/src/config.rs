//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! the original deployment used (`LINEAR_API_KEY`, `LINEAR_TEAM_ID`, `PORT`).
//! Values are read once here and handed to the rest of the process as plain,
//! immutable structs.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use linear::TrackerConfig;
use listener::ListenerConfig;
use relay::{ApiToken, TeamId};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Files a Linear issue for every Figma LIBRARY_PUBLISH webhook"
)]
pub struct Cli {
    /// Linear API key, sent verbatim as the Authorization header.
    #[arg(long, env = "LINEAR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Linear team new issues are filed under.
    #[arg(long, env = "LINEAR_TEAM_ID")]
    pub team_id: Option<String>,

    /// Linear GraphQL endpoint.
    #[arg(long, env = "LINEAR_API_URL", default_value = linear::DEFAULT_ENDPOINT)]
    pub api_url: String,

    /// Seconds to wait for Linear before giving up on a request.
    #[arg(
        long,
        env = "LINEAR_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Address to bind the webhook listener to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the webhook listener to.
    #[arg(long, env = "PORT", default_value_t = 80)]
    pub port: u16,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; spans are only exported when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Cli {
    /// Settings for the Linear client. Blank credentials become `None`.
    pub fn tracker_config(&self) -> TrackerConfig {
        let api_token = self.api_key.as_deref().and_then(ApiToken::new);
        let team_id = self.team_id.as_deref().and_then(TeamId::new);
        TrackerConfig::new(api_token, team_id)
            .with_endpoint(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}
