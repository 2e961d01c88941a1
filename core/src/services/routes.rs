use std::collections::BTreeMap;

use serde::Deserialize;

use super::territory_path;
use crate::client::Requester;
use crate::context::Context;
use crate::error::ApiError;
use crate::types::{Route, RouteList};

/// Filters for the live, in-progress routes view.
#[derive(Debug, Clone, Default)]
pub struct ListCurrentRoutesInput {
    pub territory_id: String,
    /// yyyyMMdd.
    pub date: Option<String>,
    pub vehicle: Option<String>,
}

/// Filters for the approved plans view.
#[derive(Debug, Clone, Default)]
pub struct ListApprovedRoutesInput {
    pub territory_id: String,
    /// yyyyMMdd.
    pub date: Option<String>,
}

#[derive(Deserialize)]
struct CurrentRoutesResponse {
    #[serde(default)]
    routes: BTreeMap<String, Route>,
}

/// Current and approved routes within a territory.
#[derive(Debug, Clone, Copy)]
pub struct RoutesService<'a, R> {
    client: &'a R,
}

impl<'a, R: Requester> RoutesService<'a, R> {
    pub fn new(client: &'a R) -> Self {
        Self { client }
    }

    /// List current routes, sorted by id.
    pub fn list_current(&self, ctx: &Context, input: &ListCurrentRoutesInput) -> Result<Vec<Route>, ApiError> {
        let path = territory_path(&input.territory_id, "toa/routes")?;
        let mut request = self.client.new_request::<()>("GET", &path, None)?;
        request
            .append_query("date", input.date.as_deref())
            .append_query("vehicle", input.vehicle.as_deref());
        let response: CurrentRoutesResponse = self.client.execute_json(ctx, &request)?;
        Ok(response.routes.into_values().collect())
    }

    /// List approved routes, sorted by id.
    pub fn list_approved(&self, ctx: &Context, input: &ListApprovedRoutesInput) -> Result<Vec<Route>, ApiError> {
        Ok(self.approved_plan(ctx, input)?.into_routes())
    }

    /// The approved plan with the vehicles and drivers it references.
    pub fn approved_plan(&self, ctx: &Context, input: &ListApprovedRoutesInput) -> Result<RouteList, ApiError> {
        let path = territory_path(&input.territory_id, "approved/routes")?;
        let mut request = self.client.new_request::<()>("GET", &path, None)?;
        request.append_query("date", input.date.as_deref());
        self.client.execute_json(ctx, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_with, RecordingTransport};
    use crate::http::{HttpResponse, Method};
    use crate::types::RouteStepKind;

    const CURRENT: &str = include_str!("../../../testdata/routes-list-current.json");
    const APPROVED: &str = include_str!("../../../testdata/routes-list-approved.json");

    #[test]
    fn list_current_sends_date_and_vehicle() {
        let transport = RecordingTransport::replying([HttpResponse::new(200, CURRENT)]);
        let client = client_with(transport.clone());

        let routes = client
            .routes()
            .list_current(
                &Context::background(),
                &ListCurrentRoutesInput {
                    territory_id: "territory".to_string(),
                    date: Some("20191019".to_string()),
                    vehicle: Some("vehicle".to_string()),
                },
            )
            .unwrap();
        assert_eq!(routes.len(), 2);

        let sent = transport.last();
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url.path(), "/api/v1/territories/territory/toa/routes");
        assert_eq!(sent.url.query(), Some("date=20191019&vehicle=vehicle"));
    }

    #[test]
    fn list_current_keeps_step_order() {
        let transport = RecordingTransport::replying([HttpResponse::new(200, CURRENT)]);
        let client = client_with(transport);
        let routes = client
            .routes()
            .list_current(
                &Context::background(),
                &ListCurrentRoutesInput {
                    territory_id: "territory".to_string(),
                    ..ListCurrentRoutesInput::default()
                },
            )
            .unwrap();
        for route in &routes {
            let first = route.steps.first().and_then(|s| s.kind);
            let last = route.steps.last().and_then(|s| s.kind);
            assert_eq!(first, Some(RouteStepKind::Departure));
            assert_eq!(last, Some(RouteStepKind::Arrival));
        }
    }

    #[test]
    fn list_approved_sends_only_date() {
        let transport = RecordingTransport::replying([HttpResponse::new(200, APPROVED)]);
        let client = client_with(transport.clone());

        let routes = client
            .routes()
            .list_approved(
                &Context::background(),
                &ListApprovedRoutesInput {
                    territory_id: "territory".to_string(),
                    date: Some("20191019".to_string()),
                },
            )
            .unwrap();
        assert_eq!(routes.len(), 2);

        let sent = transport.last();
        assert_eq!(sent.url.path(), "/api/v1/territories/territory/approved/routes");
        assert_eq!(sent.url.query(), Some("date=20191019"));
    }

    #[test]
    fn approved_plan_includes_vehicles_and_drivers() {
        let transport = RecordingTransport::replying([HttpResponse::new(200, APPROVED)]);
        let client = client_with(transport);

        let plan = client
            .routes()
            .approved_plan(
                &Context::background(),
                &ListApprovedRoutesInput {
                    territory_id: "territory".to_string(),
                    date: None,
                },
            )
            .unwrap();
        assert_eq!(plan.routes.len(), 2);
        assert!(!plan.vehicles.is_empty());
        assert!(!plan.drivers.is_empty());
        for route in plan.routes.values() {
            let driver = route.driver_id.as_deref().unwrap();
            assert!(plan.drivers.contains_key(driver));
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let transport = RecordingTransport::replying([HttpResponse::new(200, "{\"routes\": [")]);
        let client = client_with(transport);
        let err = client
            .routes()
            .list_approved(
                &Context::background(),
                &ListApprovedRoutesInput {
                    territory_id: "territory".to_string(),
                    date: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
