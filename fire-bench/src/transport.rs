use crate::BenchError;
use fire_bench_core::{ConfigError, HttpMethod, RunRequest};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use std::future::Future;
use thiserror::Error;

/// Why a single attempt failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// "Send one request and await the full response, or fail."
///
/// A transport is built once per concurrency level and shared by all of that level's workers.
/// `Ok(())` means the whole response body was received; the status code is not inspected.
pub trait Transport: Send + Sync + 'static {
    fn send(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// The default [`Transport`], backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    method: Method,
    url: Url,
    body: Option<Vec<u8>>,
}

impl HttpTransport {
    pub fn new(request: &RunRequest) -> Result<Self, BenchError> {
        let url = request.validate()?;
        let headers = header_map(request)?;

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(BenchError::Client)?;

        Ok(Self {
            client,
            method: method(request.method),
            url,
            body: request.effective_body().map(<[u8]>::to_vec),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self) -> Result<(), TransportError> {
        let mut builder = self.client.request(self.method.clone(), self.url.clone());
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        // NOTE: Latency includes the body transfer, not just the headers.
        response.bytes().await?;
        Ok(())
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_map(request: &RunRequest) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    for (name, value) in request.header_iter() {
        let invalid = |reason: String| ConfigError::InvalidHeader {
            name: name.to_string(),
            reason,
        };

        let key = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(key, value);
    }
    Ok(headers)
}
