use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-workwave-key";
pub const DEFAULT_API_KEY: &str = "api-key";
pub const DEMO_TERRITORY: &str = "territory";

const ORDERS_FIXTURE: &str = include_str!("../../testdata/orders-list.json");
const CURRENT_ROUTES_FIXTURE: &str = include_str!("../../testdata/routes-list-current.json");
const APPROVED_ROUTES_FIXTURE: &str = include_str!("../../testdata/routes-list-approved.json");

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Callback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub signature_password: Option<String>,
    #[serde(default, skip_serializing)]
    pub test: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Error code WorkWave reports when a callback test probe fails.
pub const CALLBACK_TEST_FAILED: i64 = 2000;

#[derive(Clone, Debug, Default)]
pub struct Territory {
    pub orders: BTreeMap<String, Value>,
    pub current_routes: BTreeMap<String, Value>,
    pub approved_routes: BTreeMap<String, Value>,
    pub vehicles: BTreeMap<String, Value>,
    pub drivers: BTreeMap<String, Value>,
}

/// One request as the server saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone, Debug)]
pub struct Store {
    pub api_key: String,
    pub callback: Option<Callback>,
    pub territories: HashMap<String, Territory>,
    pub log: Vec<Recorded>,
}

impl Store {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            callback: None,
            territories: HashMap::new(),
            log: Vec::new(),
        }
    }

    /// A store holding the bundled fixtures under `DEMO_TERRITORY`.
    pub fn demo(api_key: &str) -> Result<Self, serde_json::Error> {
        let orders: Value = serde_json::from_str(ORDERS_FIXTURE)?;
        let current: Value = serde_json::from_str(CURRENT_ROUTES_FIXTURE)?;
        let approved: Value = serde_json::from_str(APPROVED_ROUTES_FIXTURE)?;

        let territory = Territory {
            orders: id_map(&orders["orders"])?,
            current_routes: id_map(&current["routes"])?,
            approved_routes: id_map(&approved["routes"])?,
            vehicles: id_map(&approved["vehicles"])?,
            drivers: id_map(&approved["drivers"])?,
        };
        let mut store = Self::new(api_key);
        store.territories.insert(DEMO_TERRITORY.to_string(), territory);
        Ok(store)
    }
}

fn id_map(value: &Value) -> Result<BTreeMap<String, Value>, serde_json::Error> {
    serde_json::from_value(value.clone())
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Store::new(DEFAULT_API_KEY))))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route(
            "/api/v1/callback",
            get(get_callback).post(set_callback).delete(delete_callback),
        )
        .route(
            "/api/v1/territories/{territory}/orders",
            get(get_orders).post(add_orders),
        )
        .route("/api/v1/territories/{territory}/toa/routes", get(current_routes))
        .route("/api/v1/territories/{territory}/approved/routes", get(approved_routes))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

/// Record the request, then check its API key.
fn admit(
    store: &mut Store,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(), StatusCode> {
    let authorized = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == store.api_key);
    tracing::debug!(%method, %uri, authorized, "request");
    store.log.push(Recorded {
        method,
        uri,
        headers,
        body,
    });
    if authorized {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn parse_body<T: serde::de::DeserializeOwned + Default>(body: &Bytes) -> Result<T, StatusCode> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| StatusCode::BAD_REQUEST)
}

// --- callback ---

async fn get_callback(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Callback>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, body)?;
    let url = store.callback.as_ref().and_then(|c| c.url.clone());
    Ok(Json(Callback {
        url,
        ..Callback::default()
    }))
}

async fn set_callback(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Callback>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, body.clone())?;
    let input: Callback = parse_body(&body)?;

    let Some(url) = input.url.clone().filter(|u| !u.is_empty()) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    // The probe only reaches https endpoints.
    if input.test && !url.starts_with("https://") {
        return Ok(Json(Callback {
            error_code: Some(CALLBACK_TEST_FAILED),
            error_message: Some(format!(
                "Server at URL [{url}] failed to respond to the test message."
            )),
            ..Callback::default()
        }));
    }

    let previous_url = store.callback.take().and_then(|c| c.url);
    store.callback = Some(input);
    Ok(Json(Callback {
        url: Some(url),
        previous_url,
        ..Callback::default()
    }))
}

async fn delete_callback(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Callback>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, body)?;
    let previous_url = store.callback.take().and_then(|c| c.url);
    Ok(Json(Callback {
        previous_url,
        ..Callback::default()
    }))
}

// --- orders ---

/// Query filters are recorded in the log but do not narrow the result; a
/// JSON array of ids in the body does.
async fn get_orders(
    State(db): State<Db>,
    Path(territory): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, body.clone())?;
    let ids: Vec<String> = parse_body(&body)?;
    let territory = store.territories.get(&territory).ok_or(StatusCode::NOT_FOUND)?;

    let orders: BTreeMap<&String, &Value> = if ids.is_empty() {
        territory.orders.iter().collect()
    } else {
        territory
            .orders
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .collect()
    };
    Ok(Json(json!({ "orders": orders })))
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddOrders {
    #[serde(default)]
    orders: Vec<Value>,
    #[serde(default)]
    strict: bool,
}

async fn add_orders(
    State(db): State<Db>,
    Path(territory): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, body.clone())?;
    let input: AddOrders = parse_body(&body)?;
    let territory = store.territories.get_mut(&territory).ok_or(StatusCode::NOT_FOUND)?;

    if !input.orders.iter().all(Value::is_object) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if input.strict && input.orders.iter().any(|o| o.get("name").is_none()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    for mut order in input.orders {
        let id = Uuid::new_v4().to_string();
        if let Some(fields) = order.as_object_mut() {
            fields.insert("id".to_string(), Value::String(id.clone()));
        }
        territory.orders.insert(id, order);
    }
    Ok(Json(json!({ "requestId": Uuid::new_v4() })))
}

// --- routes ---

#[derive(Deserialize)]
struct RoutesQuery {
    date: Option<String>,
    vehicle: Option<String>,
}

fn matches_field(route: &Value, field: &str, wanted: Option<&str>) -> bool {
    wanted.is_none_or(|w| route.get(field).and_then(Value::as_str) == Some(w))
}

async fn current_routes(
    State(db): State<Db>,
    Path(territory): Path<String>,
    Query(filters): Query<RoutesQuery>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, Bytes::new())?;
    let territory = store.territories.get(&territory).ok_or(StatusCode::NOT_FOUND)?;

    let routes: BTreeMap<&String, &Value> = territory
        .current_routes
        .iter()
        .filter(|(_, r)| matches_field(r, "date", filters.date.as_deref()))
        .filter(|(_, r)| matches_field(r, "vehicleId", filters.vehicle.as_deref()))
        .collect();
    Ok(Json(json!({ "routes": routes })))
}

async fn approved_routes(
    State(db): State<Db>,
    Path(territory): Path<String>,
    Query(filters): Query<RoutesQuery>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    admit(&mut store, method, uri, headers, Bytes::new())?;
    let territory = store.territories.get(&territory).ok_or(StatusCode::NOT_FOUND)?;

    let routes: BTreeMap<&String, &Value> = territory
        .approved_routes
        .iter()
        .filter(|(_, r)| matches_field(r, "date", filters.date.as_deref()))
        .collect();
    Ok(Json(json!({
        "routes": routes,
        "vehicles": territory.vehicles,
        "drivers": territory.drivers,
    })))
}
