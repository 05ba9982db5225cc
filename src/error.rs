use std::{io, path::PathBuf};

use crate::trace::{HookError, TraceStage};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// Client construction rejected the supplied configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Method, URL or a header could not be turned into a wire request.
    #[error("malformed request: {0}")]
    RequestBuild(String),
    /// Connection, TLS, proxy or timeout failure from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The response envelope arrived but draining its body failed.
    #[error("body read error: {0}")]
    BodyRead(reqwest::Error),
    /// The caller's cancellation token fired while an attempt was in flight.
    #[error("request cancelled")]
    Cancelled,
    /// A trace hook reported a failure.
    #[error("trace hook failed at {stage}: {source}")]
    Hook {
        stage: TraceStage,
        #[source]
        source: HookError,
    },
}

impl PushError {
    /// Whether the retry controller may spend another attempt on this error.
    ///
    /// Only transport-level and body-read failures qualify. HTTP status codes
    /// never reach this point: any received response is a success.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::BodyRead(_))
    }
}

/// Construction-time configuration errors. Always fatal to the construction call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max retry times must be between {min} and {max}, got {value}")]
    RetryTimesOutOfRange { value: u32, min: u32, max: u32 },
    #[error("invalid proxy url '{url}': {reason}")]
    InvalidProxyUrl { url: String, reason: String },
    #[error("failed to read trust anchor {}: {source}", .path.display())]
    TrustAnchorRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid trust anchor {}: {reason}", .path.display())]
    InvalidTrustAnchor { path: PathBuf, reason: String },
    #[error("environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },
    /// The HTTP client builder rejected the assembled transport settings.
    #[error("failed to build transport: {0}")]
    Transport(reqwest::Error),
}
