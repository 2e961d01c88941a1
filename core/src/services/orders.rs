use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::territory_path;
use crate::client::Requester;
use crate::context::Context;
use crate::error::ApiError;
use crate::types::Order;

/// Filters for [`OrdersService::list`]. Unset or empty filters are not sent.
#[derive(Debug, Clone, Default)]
pub struct ListOrdersInput {
    pub territory_id: String,
    /// `assigned`, `unassigned` or `any`.
    pub include: Option<String>,
    /// yyyyMMdd.
    pub eligible_on: Option<String>,
    /// yyyyMMdd.
    pub assigned_on: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GetOrdersInput {
    pub territory_id: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AddOrdersInput {
    pub territory_id: String,
    pub orders: Vec<Order>,
    /// Reject the whole batch if any order is invalid.
    pub strict: bool,
    pub accept_bad_geocodes: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddOrdersBody<'a> {
    orders: &'a [Order],
    strict: bool,
    accept_bad_geocodes: bool,
}

#[derive(Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: BTreeMap<String, Order>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestIdResponse {
    request_id: Uuid,
}

/// Orders within a territory.
#[derive(Debug, Clone, Copy)]
pub struct OrdersService<'a, R> {
    client: &'a R,
}

impl<'a, R: Requester> OrdersService<'a, R> {
    pub fn new(client: &'a R) -> Self {
        Self { client }
    }

    /// List orders, sorted by id.
    pub fn list(&self, ctx: &Context, input: &ListOrdersInput) -> Result<Vec<Order>, ApiError> {
        let path = territory_path(&input.territory_id, "orders")?;
        let mut request = self.client.new_request::<()>("GET", &path, None)?;
        request
            .append_query("include", input.include.as_deref())
            .append_query("eligibleOn", input.eligible_on.as_deref())
            .append_query("assignedOn", input.assigned_on.as_deref());
        let response: OrdersResponse = self.client.execute_json(ctx, &request)?;
        Ok(response.orders.into_values().collect())
    }

    /// Fetch specific orders by id, sorted by id.
    pub fn get(&self, ctx: &Context, input: &GetOrdersInput) -> Result<Vec<Order>, ApiError> {
        let path = territory_path(&input.territory_id, "orders")?;
        let request = self.client.new_request("GET", &path, Some(&input.ids))?;
        let response: OrdersResponse = self.client.execute_json(ctx, &request)?;
        Ok(response.orders.into_values().collect())
    }

    /// Submit orders for creation. WorkWave processes the batch
    /// asynchronously and answers with the id of the pending request.
    pub fn add(&self, ctx: &Context, input: &AddOrdersInput) -> Result<Uuid, ApiError> {
        let path = territory_path(&input.territory_id, "orders")?;
        let body = AddOrdersBody {
            orders: &input.orders,
            strict: input.strict,
            accept_bad_geocodes: input.accept_bad_geocodes,
        };
        let request = self.client.new_request("POST", &path, Some(&body))?;
        let response: RequestIdResponse = self.client.execute_json(ctx, &request)?;
        Ok(response.request_id)
    }
}
