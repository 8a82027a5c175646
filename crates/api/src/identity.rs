//! Caller identity from trusted upstream headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::CustomerId;
use domain::Caller;

use crate::error::ApiError;

pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";
pub const ROLE_HEADER: &str = "x-role";

/// The [`Caller`] behind a request.
///
/// The authentication layer in front of this service sets `x-customer-id`
/// for signed-in customers and `x-role: admin` for staff. No headers means a
/// guest.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Caller);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer_id = match header(parts, CUSTOMER_ID_HEADER)? {
            Some(raw) => Some(raw.parse::<CustomerId>().map_err(|_| {
                ApiError::BadRequest(format!("{CUSTOMER_ID_HEADER} is not a valid id: {raw}"))
            })?),
            None => None,
        };
        let is_admin = header(parts, ROLE_HEADER)?.is_some_and(|r| r.eq_ignore_ascii_case("admin"));

        let caller = match (is_admin, customer_id) {
            (true, id) => Caller::admin(id),
            (false, Some(id)) => Caller::customer(id),
            (false, None) => Caller::guest(),
        };
        Ok(Identity(caller))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
    match parts.headers.get(name) {
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| ApiError::BadRequest(format!("{name} must be visible ASCII"))),
        None => Ok(None),
    }
}
