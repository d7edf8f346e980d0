//! Run configuration, loaded from a TOML file at startup.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Everything the pipeline needs to know before it can start a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// WebSocket endpoint of the chain node.
    pub ws_provider_url: String,
    /// Postgres connection string.
    pub database_url: String,
    /// Seconds to sleep once, before the first run.
    #[serde(default)]
    pub start_delay_secs: u64,
    /// Seconds between the end of one run and the start of the next.
    pub polling_time_secs: u64,
    /// Number of trailing eras to look back over for history/performance.
    #[serde(default = "default_history_size")]
    pub history_size: u32,
    /// Eras per day, used to convert `historySize` into a payout-rating window.
    #[serde(default = "default_eras_per_day")]
    pub eras_per_day: u32,
    /// Decimal places of the chain's native token.
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,
    /// `Staking::maxNominatorRewardedPerValidator` constant for this chain.
    pub max_nominator_rewarded_per_validator: u32,
}

fn default_history_size() -> u32 {
    84
}

fn default_eras_per_day() -> u32 {
    4
}

fn default_token_decimals() -> u32 {
    12
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_size == 0 {
            return Err(ConfigError::Invalid("historySize must be greater than 0".into()));
        }
        if self.eras_per_day == 0 {
            return Err(ConfigError::Invalid("erasPerDay must be greater than 0".into()));
        }
        let url = Url::parse(&self.ws_provider_url)
            .map_err(|e| ConfigError::Invalid(format!("wsProviderUrl is not a valid url: {e}")))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ConfigError::Invalid(
                "wsProviderUrl must use the ws:// or wss:// scheme".into(),
            ));
        }
        Ok(())
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_secs)
    }

    pub fn polling_time(&self) -> Duration {
        Duration::from_secs(self.polling_time_secs)
    }
}
