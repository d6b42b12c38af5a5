//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `WdClient` builds an `HttpRequest`,
//! hands it to a `Transport`, and interprets the returned `HttpResponse`; it
//! never opens a socket itself. Hosts can plug in their own HTTP stack by
//! implementing `Transport`, and tests drive the repositories with scripted
//! responses. `UreqTransport` is the blocking default.
//!
//! Query parameters travel as ordered pairs next to the URL rather than
//! being baked into it, so the transport owns percent-encoding.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a query key, in order.
    pub fn query_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok` data; status
/// interpretation belongs to `WdClient`. `Err` is reserved for failures that
/// produced no response at all (DNS, refused connection, timeout).
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> crate::Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> crate::Result<HttpResponse> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use super::{HttpMethod, HttpRequest, HttpResponse, Transport};
    use crate::error::ApiError;

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// The agent is configured not to turn 4xx/5xx into errors so the client
    /// sees every status as data.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self { agent }
        }
    }

    fn decorate<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
        for (key, value) in &request.query {
            builder = builder.query(key, value);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> crate::Result<HttpResponse> {
            let url = request.url.as_str();
            let result = match (request.method, request.body.as_deref()) {
                (HttpMethod::Get, _) => decorate(self.agent.get(url), request).call(),
                (HttpMethod::Post, Some(body)) => decorate(self.agent.post(url), request).send(body),
                (HttpMethod::Post, None) => decorate(self.agent.post(url), request).send_empty(),
                (HttpMethod::Put, Some(body)) => decorate(self.agent.put(url), request).send(body),
                (HttpMethod::Put, None) => decorate(self.agent.put(url), request).send_empty(),
            };
            let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
