//! Resource services.
//!
//! Each service borrows a [`Requester`](crate::client::Requester) and maps
//! one WorkWave resource onto typed calls. Services hold no state of their
//! own, so constructing one per call is free.

mod callback;
mod orders;
mod routes;

pub use callback::CallbackService;
pub use orders::{AddOrdersInput, GetOrdersInput, ListOrdersInput, OrdersService};
pub use routes::{ListApprovedRoutesInput, ListCurrentRoutesInput, RoutesService};

use crate::error::ApiError;
use crate::http::path_segment;

/// `/api/v1/territories/{id}/{rest}` with the id escaped as one segment.
fn territory_path(territory_id: &str, rest: &str) -> Result<String, ApiError> {
    let territory = path_segment(territory_id)?;
    Ok(format!("/api/v1/territories/{territory}/{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn territory_path_keeps_plain_ids() {
        assert_eq!(
            territory_path("territory", "toa/routes").unwrap(),
            "/api/v1/territories/territory/toa/routes"
        );
    }

    #[test]
    fn territory_path_escapes_reserved_characters() {
        assert_eq!(
            territory_path("a?x=1", "orders").unwrap(),
            "/api/v1/territories/a%3Fx%3D1/orders"
        );
        assert_eq!(
            territory_path("a/../../callback", "orders").unwrap(),
            "/api/v1/territories/a%2F..%2F..%2Fcallback/orders"
        );
        assert_eq!(
            territory_path("a#frag", "orders").unwrap(),
            "/api/v1/territories/a%23frag/orders"
        );
    }

    #[test]
    fn territory_path_rejects_empty_id() {
        let err = territory_path("", "orders").unwrap_err();
        assert!(matches!(err, ApiError::InvalidPath { .. }));
        assert!(territory_path("..", "orders").is_err());
    }
}
