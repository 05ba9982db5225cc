use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Body, Method, Request, Url,
};

use crate::{PushError, Result};

/// Sets one header on the built request. Later options win for the same key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderOption {
    key: String,
    value: String,
}

/// Header option that replaces any previous value of `key` with `value`.
pub fn set_header(key: impl Into<String>, value: impl Into<String>) -> HeaderOption {
    HeaderOption {
        key: key.into(),
        value: value.into(),
    }
}

impl HeaderOption {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        let name = HeaderName::from_bytes(self.key.as_bytes()).map_err(|err| {
            PushError::RequestBuild(format!("invalid header name '{}': {err}", self.key))
        })?;
        let value = HeaderValue::from_str(&self.value).map_err(|err| {
            PushError::RequestBuild(format!("invalid value for header '{}': {err}", self.key))
        })?;
        headers.insert(name, value);
        Ok(())
    }
}

/// Logical request handed to [`PushClient::execute`](crate::PushClient::execute).
///
/// The body is held in memory and replayed unchanged on every attempt. A
/// streaming source must be buffered into `body` before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub headers: Vec<HeaderOption>,
}

impl PushRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// `POST` with the given body, the shape every push send takes.
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", url).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_option(set_header(key, value))
    }

    pub fn with_option(mut self, option: HeaderOption) -> Self {
        self.headers.push(option);
        self
    }

    /// Builds a fresh wire request. Called once per attempt.
    pub(crate) fn build(&self) -> Result<Request> {
        let method = Method::from_bytes(self.method.as_bytes()).map_err(|err| {
            PushError::RequestBuild(format!("invalid method '{}': {err}", self.method))
        })?;
        let url = Url::parse(&self.url)
            .map_err(|err| PushError::RequestBuild(format!("invalid url '{}': {err}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PushError::RequestBuild(format!(
                "unsupported url scheme '{}' in '{}'",
                url.scheme(),
                self.url
            )));
        }

        let mut request = Request::new(method, url);
        if let Some(body) = &self.body {
            *request.body_mut() = Some(Body::from(body.clone()));
        }
        for option in &self.headers {
            option.apply(request.headers_mut())?;
        }
        Ok(request)
    }
}
