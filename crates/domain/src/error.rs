//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::order::OrderError;

/// Coarse error classification shared by every layer above the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing cart, order, product or line item.
    NotFound,
    /// Bad input or an operation the current state does not allow.
    Invalid,
    /// Ownership or role mismatch.
    Unauthorized,
    /// Lost an optimistic-concurrency race.
    Conflict,
    Internal,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub fn not_found(aggregate_type: &'static str, aggregate_id: impl ToString) -> Self {
        DomainError::AggregateNotFound {
            aggregate_type,
            aggregate_id: aggregate_id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::EventStore(e) if e.is_conflict() => ErrorKind::Conflict,
            DomainError::EventStore(_) | DomainError::Serialization(_) => ErrorKind::Internal,
            DomainError::Order(e) => e.kind(),
            DomainError::Cart(e) => e.kind(),
            DomainError::Catalog(e) => e.kind(),
            DomainError::AggregateNotFound { .. } => ErrorKind::NotFound,
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
        }
    }

    /// True when the operation was refused because of the order's current
    /// status rather than because of malformed input.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, DomainError::Order(e) if e.is_state_conflict())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::EventStore(e) if e.is_conflict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;
    use common::AggregateId;
    use event_store::Version;

    #[test]
    fn kinds_follow_the_underlying_error() {
        let conflict = DomainError::from(EventStoreError::ConcurrencyConflict {
            aggregate_id: AggregateId::new(),
            expected: Version::first(),
            actual: Version::new(2),
        });
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(conflict.is_conflict());

        let missing = DomainError::not_found("Order", AggregateId::new());
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let transition = DomainError::from(OrderError::InvalidTransition {
            from: OrderStatus::Delivered,
            action: "cancel",
        });
        assert_eq!(transition.kind(), ErrorKind::Invalid);
        assert!(transition.is_state_conflict());

        let denied = DomainError::Unauthorized("admin only".to_string());
        assert_eq!(denied.kind(), ErrorKind::Unauthorized);
    }
}
