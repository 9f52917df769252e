//! HTTP transport types and the pluggable `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. `TlyClient` builds an `HttpRequest`,
//! hands it to a `Transport`, and parses the `HttpResponse` that comes back.
//! A non-2xx status is data, not a transport error: classifying it is the
//! client's job. `UreqTransport` is the blocking default; tests and callers
//! with their own HTTP stack can plug in anything that implements `Transport`.

use std::fmt;

/// Boxed error produced by a transport (connection, DNS, TLS, I/O).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: base address, path and query already joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
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

/// Executes one request/response cycle.
///
/// Implementations must be shareable across threads: one client (and so one
/// transport) serves every concurrent call.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as `HttpResponse` values.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an existing agent. Its `http_status_as_error` setting must be
    /// `false`, otherwise non-2xx bodies surface as transport errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.unwrap_or_default();

        let mut response = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Delete if body.is_empty() => {
                with_headers(self.agent.delete(url), headers).call()
            }
            HttpMethod::Delete => with_headers(self.agent.delete(url), headers)
                .force_send_body()
                .send(body.as_bytes()),
            HttpMethod::Post => with_headers(self.agent.post(url), headers).send(body.as_bytes()),
            HttpMethod::Put => with_headers(self.agent.put(url), headers).send(body.as_bytes()),
        }?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = if (200..300).contains(&status) {
            response
                .body_mut()
                .with_config()
                .limit(u64::MAX)
                .read_to_string()?
        } else {
            response
                .body_mut()
                .with_config()
                .limit(u64::MAX)
                .read_to_string()
                .unwrap_or_default()
        };

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
