//! Domain DTOs for the WorkWave API.
//!
//! # Design
//! Every field is optional on the wire: absent fields decode to `None` or an
//! empty collection, and empty values are left out when serializing. The same
//! record types serve as request input and response output. Maps keyed by
//! identifiers use `BTreeMap` so iteration follows id order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// An order. Leave `id` empty when the order is used as input to add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Quantity per load type, e.g. `"pallets" -> 4`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub loads: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup: Option<OrderStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<OrderStep>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_service: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EligibilityKind {
    On,
    By,
    Any,
}

/// Which calendar dates an order may be served on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EligibilityKind>,
    /// yyyyMMdd, used with `EligibilityKind::By`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_date: Option<String>,
    /// yyyyMMdd, used with `EligibilityKind::On`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_dates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Latitude and longitude in microdegrees, e.g. `[33817872, -87266893]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<[i64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A permitted service interval, in seconds from midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default)]
    pub start_sec: i64,
    #[serde(default)]
    pub end_sec: i64,
}

/// The pickup or delivery half of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_windows: Vec<TimeWindow>,
    /// Overrides keyed by yyyyMMdd date.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub time_window_exceptions: BTreeMap<String, TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time_sec: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags_in: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags_out: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
}

/// A route for one date, vehicle and driver. `steps` are in driving order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
    /// yyyyMMdd.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<RouteStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStepKind {
    Departure,
    Arrival,
    Pickup,
    Delivery,
    #[serde(rename = "brk", alias = "break")]
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RouteStepKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_sec: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_sec: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_sec: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_data: Option<TrackingData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_sec: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Callback configuration, used both as input and as the API's reply.
///
/// `signature_password`, `test` and `headers` only matter on set. When
/// `test` is true the API probes `url` synchronously, and `error_code` and
/// `error_message` come back populated if the probe fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Callback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_password: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub test: bool,
    /// Sent with every callback POST. Keys and values together must stay
    /// under 256k characters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Callback {
    /// True when the API reported a failed callback test.
    pub fn is_rejected(&self) -> bool {
        matches!(self.error_code, Some(code) if code != 0)
    }
}

/// Response shape of the approved routes endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteList {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub routes: BTreeMap<String, Route>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vehicles: BTreeMap<String, Vehicle>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub drivers: BTreeMap<String, Driver>,
}

impl RouteList {
    /// Flatten into routes, ordered by route id.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_with_only_url_decodes_rest_to_defaults() {
        let cb: Callback = serde_json::from_str(r#"{"url":"https://x/callback"}"#).unwrap();
        assert_eq!(
            cb,
            Callback {
                url: Some("https://x/callback".to_string()),
                ..Callback::default()
            }
        );
        assert!(!cb.is_rejected());
    }

    #[test]
    fn empty_callback_serializes_to_empty_object() {
        let json = serde_json::to_string(&Callback::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn callback_omits_false_test_flag() {
        let cb = Callback {
            url: Some("https://x/cb".to_string()),
            test: false,
            ..Callback::default()
        };
        let json = serde_json::to_value(&cb).unwrap();
        assert!(json.get("test").is_none());

        let cb = Callback { test: true, ..cb };
        let json = serde_json::to_value(&cb).unwrap();
        assert_eq!(json["test"], true);
    }

    #[test]
    fn zero_error_code_is_not_a_rejection() {
        let cb: Callback = serde_json::from_str(r#"{"errorCode":0}"#).unwrap();
        assert!(!cb.is_rejected());
        let cb: Callback = serde_json::from_str(r#"{"errorCode":2000}"#).unwrap();
        assert!(cb.is_rejected());
    }

    #[test]
    fn order_uses_camel_case_names() {
        let order = Order {
            name: Some("Crates".to_string()),
            is_service: true,
            force_vehicle_id: Some("v1".to_string()),
            loads: BTreeMap::from([("pallets".to_string(), 4)]),
            eligibility: Some(Eligibility {
                kind: Some(EligibilityKind::On),
                on_dates: vec!["20191019".to_string()],
                ..Eligibility::default()
            }),
            ..Order::default()
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["isService"], true);
        assert_eq!(json["forceVehicleId"], "v1");
        assert_eq!(json["loads"]["pallets"], 4);
        assert_eq!(json["eligibility"]["type"], "on");
        assert_eq!(json["eligibility"]["onDates"][0], "20191019");
        assert!(json.get("id").is_none());
        assert!(json.get("pickup").is_none());
    }

    #[test]
    fn order_step_decodes_nested_fields() {
        let step: OrderStep = serde_json::from_str(
            r#"{
                "depotId": "d1",
                "location": {"address": "1 Main St", "latLng": [33817872, -87266893]},
                "timeWindows": [{"startSec": 28800, "endSec": 36000}],
                "timeWindowExceptions": {"20191225": {"startSec": 0, "endSec": 0}},
                "serviceTimeSec": 300,
                "tagsIn": ["fragile"],
                "customFields": {"gate": "4"}
            }"#,
        )
        .unwrap();
        assert_eq!(step.depot_id.as_deref(), Some("d1"));
        let location = step.location.unwrap();
        assert_eq!(location.lat_lng, Some([33817872, -87266893]));
        assert_eq!(location.status, None);
        assert_eq!(step.time_windows, vec![TimeWindow { start_sec: 28800, end_sec: 36000 }]);
        assert_eq!(step.time_window_exceptions["20191225"], TimeWindow::default());
        assert_eq!(step.service_time_sec, Some(300));
        assert_eq!(step.tags_in, vec!["fragile".to_string()]);
        assert!(step.tags_out.is_empty());
        assert_eq!(step.custom_fields["gate"], "4");
    }

    #[test]
    fn route_step_kinds() {
        let steps: Vec<RouteStep> = serde_json::from_str(
            r#"[{"type":"departure"},{"type":"pickup"},{"type":"brk"},{"type":"break"},{"type":"arrival"}]"#,
        )
        .unwrap();
        let kinds: Vec<_> = steps.iter().map(|s| s.kind.unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                RouteStepKind::Departure,
                RouteStepKind::Pickup,
                RouteStepKind::Break,
                RouteStepKind::Break,
                RouteStepKind::Arrival,
            ]
        );
        let json = serde_json::to_value(&steps[2]).unwrap();
        assert_eq!(json["type"], "brk");
    }

    #[test]
    fn unknown_route_step_kind_is_rejected() {
        let result: Result<RouteStep, _> = serde_json::from_str(r#"{"type":"teleport"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn route_list_flattens_in_id_order() {
        let list: RouteList = serde_json::from_str(
            r#"{"routes": {"b": {"id": "b"}, "a": {"id": "a"}}, "drivers": {"d": {"name": "Dana"}}}"#,
        )
        .unwrap();
        assert_eq!(list.drivers["d"].name.as_deref(), Some("Dana"));
        assert!(list.vehicles.is_empty());
        let ids: Vec<_> = list.into_routes().into_iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
