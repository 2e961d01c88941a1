//! Blocking client for the WorkWave Route Manager API.
//!
//! # Overview
//! Typed access to callbacks, orders and routes. Every call is a single
//! request/response round trip: build a request, send it, check the status,
//! decode the JSON body.
//!
//! # Design
//! - `Client` holds only immutable configuration and is safe to share
//!   across threads.
//! - Request building is pure; `Transport` is the only I/O seam, with a
//!   pooled `ureq` agent as the default.
//! - Resource services are generic over `Requester`, so they work against
//!   any type that can build and execute requests.
//! - Id-keyed responses are flattened in id order.
//!
//! ```no_run
//! use workwave_core::{Client, Context, ListOrdersInput};
//!
//! let client = Client::new("api-key")?;
//! let orders = client.orders().list(
//!     &Context::with_timeout(std::time::Duration::from_secs(10)),
//!     &ListOrdersInput {
//!         territory_id: "territory".to_string(),
//!         include: Some("assigned".to_string()),
//!         ..ListOrdersInput::default()
//!     },
//! )?;
//! # Ok::<(), workwave_core::ApiError>(())
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod services;
pub mod transport;
pub mod types;

pub use client::{Client, ClientBuilder, Requester};
pub use context::Context;
pub use error::{ApiError, Result};
pub use http::{HttpRequest, HttpResponse, Method};
pub use services::{
    AddOrdersInput, CallbackService, GetOrdersInput, ListApprovedRoutesInput, ListCurrentRoutesInput,
    ListOrdersInput, OrdersService, RoutesService,
};
pub use transport::{Transport, TransportConfig, UreqTransport};
pub use types::{
    Callback, Driver, Eligibility, EligibilityKind, Location, Order, OrderStep, Route, RouteList, RouteStep,
    RouteStepKind, TimeWindow, TrackingData, Vehicle,
};
