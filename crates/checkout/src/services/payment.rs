//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use common::Money;

use crate::error::CheckoutError;

/// A payment authorized by the gateway, to be confirmed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentHandle {
    pub intent_id: String,
    pub client_secret: String,
}

/// Trait for the third-party payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes `amount` in `currency`.
    async fn authorize(&self, amount: Money, currency: &str)
    -> Result<PaymentHandle, CheckoutError>;

    /// Refunds part or all of an authorized payment. Returns the gateway's
    /// refund reference.
    async fn refund(&self, intent_id: &str, amount: Money) -> Result<String, CheckoutError>;
}

#[derive(Debug, Clone)]
struct Intent {
    amount: Money,
    currency: String,
    refunded: Money,
}

#[derive(Debug, Default)]
struct GatewayState {
    intents: HashMap<String, Intent>,
    next_id: u32,
    decline_authorizations: bool,
    fail_refunds: bool,
}

/// In-memory payment gateway for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following authorization fail as declined.
    pub fn set_decline_authorizations(&self, decline: bool) {
        self.write().decline_authorizations = decline;
    }

    /// Makes every following refund fail.
    pub fn set_fail_refunds(&self, fail: bool) {
        self.write().fail_refunds = fail;
    }

    pub fn intent_count(&self) -> usize {
        self.read().intents.len()
    }

    /// Amount and currency authorized under `intent_id`.
    pub fn authorized(&self, intent_id: &str) -> Option<(Money, String)> {
        self.read()
            .intents
            .get(intent_id)
            .map(|intent| (intent.amount, intent.currency.clone()))
    }

    pub fn refunded(&self, intent_id: &str) -> Money {
        self.read()
            .intents
            .get(intent_id)
            .map(|intent| intent.refunded)
            .unwrap_or_default()
    }

    fn read(&self) -> RwLockReadGuard<'_, GatewayState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, GatewayState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn authorize(
        &self,
        amount: Money,
        currency: &str,
    ) -> Result<PaymentHandle, CheckoutError> {
        let mut state = self.write();

        if state.decline_authorizations {
            return Err(CheckoutError::PaymentDeclined("card declined".to_string()));
        }
        if amount.is_negative() {
            return Err(CheckoutError::PaymentGateway(format!(
                "cannot authorize a negative amount: {amount}"
            )));
        }

        state.next_id += 1;
        let intent_id = format!("pi_{:06}", state.next_id);
        let client_secret = format!("{intent_id}_secret");
        state.intents.insert(
            intent_id.clone(),
            Intent {
                amount,
                currency: currency.to_ascii_lowercase(),
                refunded: Money::zero(),
            },
        );

        Ok(PaymentHandle {
            intent_id,
            client_secret,
        })
    }

    async fn refund(&self, intent_id: &str, amount: Money) -> Result<String, CheckoutError> {
        let mut state = self.write();

        if state.fail_refunds {
            return Err(CheckoutError::PaymentGateway(
                "refund service unavailable".to_string(),
            ));
        }
        let intent = state.intents.get_mut(intent_id).ok_or_else(|| {
            CheckoutError::PaymentGateway(format!("unknown payment intent {intent_id}"))
        })?;
        if intent.refunded + amount > intent.amount {
            return Err(CheckoutError::PaymentGateway(format!(
                "refund of {amount} exceeds the remaining {}",
                intent.amount - intent.refunded
            )));
        }
        intent.refunded += amount;

        Ok(format!("re_{intent_id}"))
    }
}
