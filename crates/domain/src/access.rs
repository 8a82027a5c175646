//! Who is asking.

use common::CustomerId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Customer,
    Admin,
}

/// The identity attached to a request by the upstream authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub customer_id: Option<CustomerId>,
    pub role: Role,
}

impl Caller {
    pub fn guest() -> Self {
        Self {
            customer_id: None,
            role: Role::Guest,
        }
    }

    pub fn customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            role: Role::Customer,
        }
    }

    pub fn admin(customer_id: Option<CustomerId>) -> Self {
        Self {
            customer_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Unauthorized(
                "this action requires an administrator".to_string(),
            ))
        }
    }

    /// Returns the caller's customer id, or `Unauthorized` for guests.
    pub fn require_customer(&self) -> Result<CustomerId, DomainError> {
        self.customer_id
            .ok_or_else(|| DomainError::Unauthorized("sign in required".to_string()))
    }

    /// True if the caller owns a resource belonging to `owner`.
    /// Guest-owned resources (`None`) are never owned by anyone.
    pub fn owns(&self, owner: Option<CustomerId>) -> bool {
        matches!((self.customer_id, owner), (Some(me), Some(owner)) if me == owner)
    }

    /// Admins may act on anything; everyone else only on what they own.
    pub fn can_access(&self, owner: Option<CustomerId>) -> bool {
        self.is_admin() || self.owns(owner)
    }
}
