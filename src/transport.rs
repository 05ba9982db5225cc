use std::{fs, path::Path, time::Duration};

use reqwest::{Certificate, Proxy, Url};

use crate::{ClientConfig, ConfigError};

/// Idle connections kept per host.
pub const MAX_IDLE_CONNECTIONS: usize = 10;

/// How long an idle pooled connection is kept alive.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the shared `reqwest::Client` for `config`.
///
/// Every configured trust anchor is appended to the built-in roots, whether or
/// not a proxy is set. Any failure aborts construction.
pub(crate) fn build_transport(config: &ClientConfig) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
        .pool_idle_timeout(IDLE_TIMEOUT)
        // Compression stays under caller control through explicit headers.
        .no_gzip()
        .no_brotli()
        .no_deflate();

    builder = match config.proxy_url.as_deref() {
        Some(raw) => {
            let url = parse_proxy_url(raw)?;
            let proxy = Proxy::all(url).map_err(|err| ConfigError::InvalidProxyUrl {
                url: raw.to_owned(),
                reason: err.to_string(),
            })?;
            builder.proxy(proxy)
        }
        // Direct connection; ambient HTTP(S)_PROXY variables are ignored.
        None => builder.no_proxy(),
    };

    for path in config.trust_anchor_paths() {
        for certificate in load_trust_anchor(path)? {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(ConfigError::Transport)
}

/// Accepts absolute `http`/`https` proxy URLs with a host.
pub(crate) fn parse_proxy_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidProxyUrl {
        url: raw.to_owned(),
        reason,
    };

    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}

/// Reads a PEM bundle; a file without a single decodable certificate is rejected.
pub(crate) fn load_trust_anchor(path: &Path) -> Result<Vec<Certificate>, ConfigError> {
    let pem = fs::read(path).map_err(|source| ConfigError::TrustAnchorRead {
        path: path.to_path_buf(),
        source,
    })?;

    let certificates =
        Certificate::from_pem_bundle(&pem).map_err(|err| ConfigError::InvalidTrustAnchor {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    if certificates.is_empty() {
        return Err(ConfigError::InvalidTrustAnchor {
            path: path.to_path_buf(),
            reason: "no PEM certificates found".to_owned(),
        });
    }

    // PEM framing says nothing about the DER inside; the root store only
    // decodes it at build time, so try each certificate on its own.
    for certificate in &certificates {
        reqwest::Client::builder()
            .no_proxy()
            .add_root_certificate(certificate.clone())
            .build()
            .map_err(|err| ConfigError::InvalidTrustAnchor {
                path: path.to_path_buf(),
                reason: format!("certificate rejected: {err}"),
            })?;
    }
    Ok(certificates)
}

/// Proxy URL with userinfo stripped, for logs and `Debug` output.
pub(crate) fn redacted_proxy(url: &Url) -> String {
    let mut redacted = url.clone();
    if !redacted.username().is_empty() || redacted.password().is_some() {
        // Setters only fail on cannot-be-a-base URLs, which parse_proxy_url rejects.
        let _ = redacted.set_username("redacted");
        let _ = redacted.set_password(None);
    }
    redacted.to_string()
}
