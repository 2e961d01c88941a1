//! Network execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only seam that does I/O. `UreqTransport` is the
//! default, backed by a pooled blocking `ureq::Agent`; tests substitute
//! their own implementation to capture requests and return canned
//! responses. Status codes always come back as data so the client alone
//! decides what counts as success.

use std::time::Duration;

use ureq::http::Method;
use ureq::{Agent, RequestBuilder};

use crate::context::Context;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round trip.
pub trait Transport: Send + Sync {
    fn send(&self, ctx: &Context, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Connection settings for `UreqTransport`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Overall limit per request. The call's `Context` deadline wins when set.
    pub request_timeout: Option<Duration>,
    pub max_idle_connections: usize,
    pub max_idle_connections_per_host: usize,
    pub idle_timeout: Duration,
    /// Largest response body accepted, in bytes.
    pub max_body_size: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: None,
            max_idle_connections: 100,
            max_idle_connections_per_host: parallelism + 1,
            idle_timeout: Duration::from_secs(60),
            max_body_size: u64::MAX,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn max_idle_connections(mut self, max: usize) -> Self {
        self.max_idle_connections = max;
        self
    }

    pub fn max_idle_connections_per_host(mut self, max: usize) -> Self {
        self.max_idle_connections_per_host = max;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn max_body_size(mut self, max: u64) -> Self {
        self.max_body_size = max;
        self
    }
}

/// Blocking transport over a shared `ureq::Agent`. Cloning shares the pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    max_body_size: u64,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(config.connect_timeout))
            .timeout_global(config.request_timeout)
            .max_idle_connections(config.max_idle_connections)
            .max_idle_connections_per_host(config.max_idle_connections_per_host)
            .max_idle_age(config.idle_timeout)
            .build()
            .new_agent();
        Self {
            agent,
            max_body_size: config.max_body_size,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, ctx: &Context, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let timeout = ctx.remaining()?;
        let url = request.url.as_str();
        let body = request.body.as_deref().map(str::as_bytes);

        // GET and DELETE carry a JSON body on some endpoints, so ureq's
        // no-body builders are forced open when one is present.
        let result = match request.method {
            Method::GET => send_without_body(prepare(self.agent.get(url), request, timeout), body),
            Method::DELETE => {
                send_without_body(prepare(self.agent.delete(url), request, timeout), body)
            }
            Method::HEAD => send_without_body(prepare(self.agent.head(url), request, timeout), body),
            Method::OPTIONS => {
                send_without_body(prepare(self.agent.options(url), request, timeout), body)
            }
            Method::POST => send_with_body(prepare(self.agent.post(url), request, timeout), body),
            Method::PUT => send_with_body(prepare(self.agent.put(url), request, timeout), body),
            Method::PATCH => send_with_body(prepare(self.agent.patch(url), request, timeout), body),
            ref other => return Err(ApiError::UnsupportedMethod(other.to_string())),
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        // ureq caps `read_to_vec` at 10 MiB unless a limit is given.
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_size)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn prepare<B>(
    builder: RequestBuilder<B>,
    request: &HttpRequest,
    timeout: Option<Duration>,
) -> RequestBuilder<B> {
    let mut builder = request
        .headers
        .iter()
        .fold(builder, |b, (k, v)| b.header(k.as_str(), v.as_str()));
    if timeout.is_some() {
        builder = builder.config().timeout_global(timeout).build();
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<ureq::typestate::WithoutBody>,
    body: Option<&[u8]>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.force_send_body().send(body),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&[u8]>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}
