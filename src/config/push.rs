//! Push channel configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Push channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Path of the push endpoint on the inventory service.
    #[serde(default = "default_channel_path")]
    pub channel_path: String,

    /// Fixed delay between a lost connection and the next attempt.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl PushConfig {
    /// Derive the push channel URL from the REST base URL.
    ///
    /// `http://` becomes `ws://` and `https://` becomes `wss://`.
    pub fn ws_url(&self, api_base_url: &str) -> String {
        let trimmed = api_base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = trimmed.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{trimmed}")
        };
        format!("{}{}", ws_base, self.channel_path)
    }

    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Validate the push channel configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.channel_path.starts_with('/') {
            return Err(ValidationError::InvalidChannelPath);
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ValidationError::InvalidReconnectDelay);
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            channel_path: default_channel_path(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_channel_path() -> String {
    "/ws".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}
