use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::{
    retry::{wait_for_retry, Decision, RetryState},
    trace::{HookError, TraceStage},
    transport::{build_transport, parse_proxy_url, redacted_proxy},
    ClientConfig, PushError, PushRequest, PushResponse, Result, RetryPolicy, TraceHooks,
};

#[derive(Clone)]
/// Reusable HTTP client bound to one transport and one retry policy.
///
/// Cloning is cheap and shares the connection pool; concurrent calls need no
/// external locking.
pub struct PushClient {
    http: reqwest::Client,
    retry: RetryPolicy,
    proxy: Option<String>,
}

impl fmt::Debug for PushClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushClient")
            .field("proxy", &self.proxy)
            .field("retry", &self.retry)
            .finish()
    }
}

impl PushClient {
    /// Direct connection, system roots, a single attempt per call.
    pub fn new() -> Result<Self> {
        Self::from_config(&ClientConfig::default())
    }

    /// Validates `config` and wires the transport.
    ///
    /// Fails with [`PushError::Config`] on an out-of-range retry count, a
    /// malformed proxy URL, or an unreadable or undecodable trust anchor file. No
    /// partially configured client is ever returned.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let retry = RetryPolicy::new(config.max_retry_times, config.retry_interval)?;
        let http = build_transport(config)?;
        let proxy = match config.proxy_url.as_deref() {
            Some(raw) => Some(redacted_proxy(&parse_proxy_url(raw)?)),
            None => None,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            proxy = proxy.as_deref().unwrap_or("<direct>"),
            trust_anchors = config.trust_anchor_paths().count(),
            max_retry_times = retry.max_retry_times(),
            retry_interval_ms = retry.retry_interval().as_millis() as u64,
            "push http client constructed"
        );

        Ok(Self { http, retry, proxy })
    }

    /// Creates a client from `HMS_PUSH_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends `request`, retrying transport and body-read failures.
    ///
    /// Any received response is returned as-is, whatever its status. The
    /// error returned after the last attempt is that attempt's own error.
    pub async fn execute(
        &self,
        request: &PushRequest,
        cancel: &CancellationToken,
    ) -> Result<PushResponse> {
        self.execute_traced(request, cancel, &TraceHooks::default())
            .await
    }

    /// Same as [`PushClient::execute`], invoking `trace` on every attempt.
    pub async fn execute_traced(
        &self,
        request: &PushRequest,
        cancel: &CancellationToken,
        trace: &TraceHooks,
    ) -> Result<PushResponse> {
        let mut state = RetryState::Attempting { attempt: 1 };
        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt,
                        max_retry_times = self.retry.max_retry_times(),
                        method = %request.method,
                        url = %request.url,
                        "sending push request"
                    );

                    let result = self.try_once(request, cancel, trace).await;
                    match (self.retry.decide(attempt, &result), result) {
                        (Decision::Retry { delay }, Err(last_error)) => {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(
                                attempt,
                                error = %last_error,
                                "push request attempt failed, retrying after {} ms",
                                delay.as_millis()
                            );

                            RetryState::WaitingToRetry {
                                attempt,
                                delay,
                                last_error,
                            }
                        }
                        (_, result) => return result,
                    }
                }
                RetryState::WaitingToRetry {
                    attempt,
                    delay,
                    last_error,
                } => {
                    if !wait_for_retry(delay, cancel).await {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempt, "push request cancelled between attempts");

                        return Err(last_error);
                    }
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
            };
        }
    }

    /// One build, send and drain cycle.
    ///
    /// The response is consumed or dropped on every path, which hands its
    /// connection back to the pool or closes it.
    async fn try_once(
        &self,
        request: &PushRequest,
        cancel: &CancellationToken,
        trace: &TraceHooks,
    ) -> Result<PushResponse> {
        let wire = request.build()?;
        if cancel.is_cancelled() {
            return Err(PushError::Cancelled);
        }
        let sent = wire
            .body()
            .and_then(|body| body.as_bytes())
            .unwrap_or_default();
        trace.request_body(sent).map_err(hook_failed)?;

        let mut response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PushError::Cancelled),
            response = self.http.execute(wire) => response.map_err(PushError::Transport)?,
        };

        let status = response.status().as_u16();
        trace.response_status(status).map_err(hook_failed)?;

        let headers = std::mem::take(response.headers_mut());
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PushError::Cancelled),
            body = response.bytes() => body.map_err(PushError::BodyRead)?,
        };
        trace.response_body(&body).map_err(hook_failed)?;

        Ok(PushResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn hook_failed((stage, source): (TraceStage, HookError)) -> PushError {
    PushError::Hook { stage, source }
}
