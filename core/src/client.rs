//! Request building and response execution for the WorkWave API.
//!
//! # Design
//! `Client` holds only immutable configuration: base URL, API key and a
//! shared `Transport`. Every operation runs through the same two steps.
//! `new_request` produces a fully headed `HttpRequest` without touching the
//! network, and `execute` sends it, checks the status and hands back the
//! body. The resource services are written against the `Requester` trait
//! rather than `Client` directly.

use std::io::Write;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::context::Context;
use crate::error::ApiError;
use crate::http::{check_escapes, parse_method, HttpRequest, HttpResponse};
use crate::services::{CallbackService, OrdersService, RoutesService};
use crate::transport::{Transport, TransportConfig, UreqTransport};

pub const API_BASE_URL: &str = "https://wwrm.workwave.com";
pub const API_KEY_HEADER: &str = "X-WorkWave-Key";
pub const USER_AGENT: &str = concat!("workwave-rs/", env!("CARGO_PKG_VERSION"));
pub const CONTENT_TYPE: &str = "application/json";

/// The only status accepted as success. See DESIGN.md.
pub const SUCCESS_STATUS: u16 = 200;

/// Build and execute requests. Implemented by `Client`, and consumed by
/// every resource service.
pub trait Requester {
    /// Build a request for `path`, resolved against the base URL, with an
    /// optional JSON body.
    fn new_request<B>(&self, method: &str, path: &str, body: Option<&B>) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized;

    /// Send `request` and check its status. The body is returned untouched.
    fn execute(&self, ctx: &Context, request: &HttpRequest) -> Result<HttpResponse, ApiError>;

    /// Send `request` and decode the JSON body into `T`.
    fn execute_json<T>(&self, ctx: &Context, request: &HttpRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(ctx, request)?;
        decode_json(&response)
    }

    /// Send `request` and copy the raw body into `sink` without parsing it.
    /// Returns the number of bytes written.
    fn execute_into(
        &self,
        ctx: &Context,
        request: &HttpRequest,
        sink: &mut dyn Write,
    ) -> Result<u64, ApiError> {
        let response = self.execute(ctx, request)?;
        sink.write_all(&response.body)?;
        Ok(response.body.len() as u64)
    }
}

/// Thread-safe client for the WorkWave API. Cloning is cheap; clones share
/// the connection pool.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client against the production endpoint with default transport settings.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: &str) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn callback(&self) -> CallbackService<'_, Self> {
        CallbackService::new(self)
    }

    pub fn orders(&self) -> OrdersService<'_, Self> {
        OrdersService::new(self)
    }

    pub fn routes(&self) -> RoutesService<'_, Self> {
        RoutesService::new(self)
    }
}

impl Requester for Client {
    fn new_request<B>(&self, method: &str, path: &str, body: Option<&B>) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let method = parse_method(method)?;
        check_escapes(path)?;
        let url = self.base_url.join(path).map_err(|e| ApiError::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::SerializationError)?;

        Ok(HttpRequest {
            method,
            url,
            headers: vec![
                (API_KEY_HEADER.to_string(), self.api_key.clone()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("Accept".to_string(), CONTENT_TYPE.to_string()),
            ],
            body,
        })
    }

    fn execute(&self, ctx: &Context, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending WorkWave request");
        let response = self.transport.send(ctx, request)?;
        debug!(method = %request.method, url = %request.url, status = response.status, "received WorkWave response");
        check_status(&response)?;
        Ok(response)
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    transport_config: TransportConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: API_BASE_URL.to_string(),
            transport_config: TransportConfig::default(),
            transport: None,
        }
    }

    /// Point the client somewhere other than production, e.g. a mock server.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Settings for the default ureq transport. Ignored when a custom
    /// transport is supplied.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| ApiError::InvalidPath {
            path: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::new(&self.transport_config)),
        };
        Ok(Client {
            base_url,
            api_key: self.api_key,
            transport,
        })
    }
}

/// Accept exactly `SUCCESS_STATUS`; anything else becomes `HttpStatus`.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == SUCCESS_STATUS {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        status: response.status,
    })
}

pub(crate) fn decode_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(ApiError::DeserializationError)
}
