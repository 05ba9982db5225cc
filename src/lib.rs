//! `hmspush-http` is the resilient HTTP transport underneath a push-notification
//! API client.
//!
//! A [`PushClient`] is built once from a [`ClientConfig`] (proxy, extra trust
//! anchors, retry policy) and then shared across calls:
//! - [`PushClient::execute`] sends a [`PushRequest`] with fixed-interval retry
//!   on transport failures, honoring a caller cancellation token;
//! - [`PushClient::execute_traced`] does the same while reporting raw request
//!   and response bytes to [`TraceHooks`].

mod client;
mod error;
mod options;
mod request;
mod retry;
mod trace;
mod transport;
mod types;

pub use client::PushClient;
pub use error::{ConfigError, PushError};
pub use options::{ClientConfig, RetryPolicy, MAX_RETRY_TIMES};
pub use request::{set_header, HeaderOption, PushRequest};
pub use tokio_util::sync::CancellationToken;
pub use trace::{HookError, TraceHooks, TraceStage};
pub use transport::{IDLE_TIMEOUT, MAX_IDLE_CONNECTIONS};
pub use types::PushResponse;

pub type Result<T> = std::result::Result<T, PushError>;
