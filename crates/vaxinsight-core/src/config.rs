//! Agent configuration: built-in defaults, optional TOML file, then environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | VAXINSIGHT_CONFIG | config/vaxinsight.toml | Path of the optional TOML file. |
//! | VAXINSIGHT__AGENT_NAME | VaxInsight_Enhanced | Name used in logs and the self-description. |
//! | VAXINSIGHT__ADDRESS | agent://vaxinsight | Address the agent receives messages on. |
//! | VAXINSIGHT__REPORT_INTERVAL_SECS | 10 | Periodic analytics report; 0 disables. |
//! | VAXINSIGHT__SIMULATION_INTERVAL_SECS | 10 | Periodic baseline simulation; 0 disables. |
//! | VAXINSIGHT__MAX_HISTORY | unset | Sentiment history bound; unset keeps everything. |
//! | VAXINSIGHT__METRIC_DEFAULTS__<KEY> | 0.2 | Fallback for a missing metric, in (0, 1). |
//! | VAXINSIGHT__LOG_FILE | unset | Also write logs to this file. |

use crate::error::CoreResult;
use crate::shared::MetricDefaults;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "VAXINSIGHT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/vaxinsight.toml";
pub const ENV_PREFIX: &str = "VAXINSIGHT";

const DEFAULT_AGENT_NAME: &str = "VaxInsight_Enhanced";
const DEFAULT_ADDRESS: &str = "agent://vaxinsight";
const DEFAULT_INTERVAL_SECS: u64 = 10;

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent_name: String,
    pub address: String,
    #[serde(default = "default_interval_secs")]
    pub report_interval_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub simulation_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
    #[serde(default)]
    pub metric_defaults: MetricDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            report_interval_secs: DEFAULT_INTERVAL_SECS,
            simulation_interval_secs: DEFAULT_INTERVAL_SECS,
            max_history: None,
            metric_defaults: MetricDefaults::default(),
            log_file: None,
        }
    }
}

impl AgentConfig {
    /// Load config. Precedence: env `VAXINSIGHT__*` > file at `VAXINSIGHT_CONFIG` (or
    /// `config/vaxinsight.toml`) > defaults. A missing file is not an error.
    pub fn load() -> CoreResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with(Some(Path::new(&path)), ENV_PREFIX)
    }

    /// Same as [`AgentConfig::load`] with an explicit file and env prefix.
    pub fn load_with(path: Option<&Path>, env_prefix: &str) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .set_default("agent_name", DEFAULT_AGENT_NAME)?
            .set_default("address", DEFAULT_ADDRESS)?
            .set_default("report_interval_secs", DEFAULT_INTERVAL_SECS as i64)?
            .set_default("simulation_interval_secs", DEFAULT_INTERVAL_SECS as i64)?;

        let builder = match path {
            Some(p) if p.exists() => builder.add_source(config::File::from(p)),
            _ => builder,
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: AgentConfig = built.try_deserialize()?;
        cfg.metric_defaults = cfg.metric_defaults.sanitized();
        cfg.max_history = cfg.max_history.filter(|&n| n > 0);
        Ok(cfg)
    }

    pub fn report_interval(&self) -> Option<Duration> {
        interval(self.report_interval_secs)
    }

    pub fn simulation_interval(&self) -> Option<Duration> {
        interval(self.simulation_interval_secs)
    }
}

fn interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_disables_timer() {
        let cfg = AgentConfig {
            report_interval_secs: 0,
            ..AgentConfig::default()
        };
        assert_eq!(cfg.report_interval(), None);
        assert_eq!(cfg.simulation_interval(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AgentConfig::load_with(
            Some(Path::new("/nonexistent/vaxinsight.toml")),
            "VAXINSIGHT_UNIT_TEST_NO_ENV",
        )
        .expect("load defaults");
        assert_eq!(cfg, AgentConfig::default());
    }
}
