use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Upper bound accepted for [`ClientConfig::max_retry_times`].
pub const MAX_RETRY_TIMES: u32 = 5;

/// Configures proxy, trust anchors, retry and timeout behavior.
///
/// Deserializes with every field optional; durations are integer milliseconds
/// under `retry_interval_ms` and `request_timeout_ms`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Proxy every request is routed through. Direct connection when unset.
    pub proxy_url: Option<String>,
    /// PEM bundle added to the built-in roots.
    pub trusted_ca_path: Option<PathBuf>,
    /// PEM bundle for a TLS-terminating proxy, added to the built-in roots.
    pub proxy_ca_cert_path: Option<PathBuf>,
    /// Total attempts per call, including the first one. `1..=5`.
    pub max_retry_times: u32,
    /// Fixed delay between attempts. Zero retries immediately.
    #[serde(rename = "retry_interval_ms", with = "millis")]
    pub retry_interval: Duration,
    /// Transport timeout for a whole attempt.
    #[serde(rename = "request_timeout_ms", with = "opt_millis")]
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            trusted_ca_path: None,
            proxy_ca_cert_path: None,
            max_retry_times: 1,
            retry_interval: Duration::ZERO,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from `HMS_PUSH_*` environment variables.
    ///
    /// - `HMS_PUSH_PROXY_URL`
    /// - `HMS_PUSH_TRUSTED_CA`
    /// - `HMS_PUSH_PROXY_CA_CERT`
    /// - `HMS_PUSH_MAX_RETRY_TIMES`
    /// - `HMS_PUSH_RETRY_INTERVAL_MS`
    /// - `HMS_PUSH_REQUEST_TIMEOUT_MS`
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            read(name)
                .map(|value| {
                    value.parse::<u64>().map_err(|err| ConfigError::Env {
                        name,
                        reason: format!("'{value}' is not a non-negative integer: {err}"),
                    })
                })
                .transpose()
        };

        let defaults = Self::default();
        let max_retry_times = match number("HMS_PUSH_MAX_RETRY_TIMES")? {
            Some(value) => u32::try_from(value).map_err(|_| ConfigError::Env {
                name: "HMS_PUSH_MAX_RETRY_TIMES",
                reason: format!("{value} is too large"),
            })?,
            None => defaults.max_retry_times,
        };

        Ok(Self {
            proxy_url: read("HMS_PUSH_PROXY_URL"),
            trusted_ca_path: read("HMS_PUSH_TRUSTED_CA").map(PathBuf::from),
            proxy_ca_cert_path: read("HMS_PUSH_PROXY_CA_CERT").map(PathBuf::from),
            max_retry_times,
            retry_interval: number("HMS_PUSH_RETRY_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_interval),
            request_timeout: number("HMS_PUSH_REQUEST_TIMEOUT_MS")?.map(Duration::from_millis),
        })
    }

    /// Trust anchor files in the order they are applied.
    pub(crate) fn trust_anchor_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.trusted_ca_path
            .iter()
            .chain(self.proxy_ca_cert_path.iter())
    }
}

/// Validated retry settings bound into a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retry_times: u32,
    retry_interval: Duration,
}

impl Default for RetryPolicy {
    /// A single attempt, no retry.
    fn default() -> Self {
        Self {
            max_retry_times: 1,
            retry_interval: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Rejects `max_retry_times` outside `1..=MAX_RETRY_TIMES`; never clamps.
    pub fn new(max_retry_times: u32, retry_interval: Duration) -> Result<Self, ConfigError> {
        if !(1..=MAX_RETRY_TIMES).contains(&max_retry_times) {
            return Err(ConfigError::RetryTimesOutOfRange {
                value: max_retry_times,
                min: 1,
                max: MAX_RETRY_TIMES,
            });
        }
        Ok(Self {
            max_retry_times,
            retry_interval,
        })
    }

    pub fn max_retry_times(&self) -> u32 {
        self.max_retry_times
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::millis::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|value| value.map(Duration::from_millis))
    }
}
