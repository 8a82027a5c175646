//! Checkout coordinator.

use std::sync::Arc;
use std::time::Instant;

use common::{AggregateId, CustomerId};
use domain::order::RefundStatus;
use domain::{
    Address, CancelOrder, Caller, CartService, Coupon, CouponRepository, DomainError,
    InventoryAdjuster, Order, OrderError, OrderLine, OrderService, PlaceOrder, ReviewRefund,
    StockReservation,
};
use event_store::EventStore;
use serde::Deserialize;

use crate::error::{CheckoutError, Result};
use crate::services::PaymentGateway;

/// What the client submits at checkout.
///
/// Signed-in customers check out their cart; `items` is only read for guests.
/// Addresses and coupon given here take precedence over the cart's.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// A successful checkout: the pending order and the secret the client needs
/// to confirm payment.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub client_secret: String,
}

struct Snapshot {
    customer_id: Option<CustomerId>,
    lines: Vec<OrderLine>,
    shipping_address: Address,
    coupon: Option<Coupon>,
}

/// Orchestrates checkout and refund payout.
///
/// Each step is a call into a domain service; a failed step undoes the
/// stock reservations made so far and cancels the order.
pub struct CheckoutCoordinator<S: EventStore> {
    orders: Arc<OrderService<S>>,
    carts: Arc<CartService<S>>,
    inventory: Arc<dyn InventoryAdjuster>,
    coupons: Arc<dyn CouponRepository>,
    payments: Arc<dyn PaymentGateway>,
    currency: String,
}

impl<S: EventStore> CheckoutCoordinator<S> {
    pub fn new(
        orders: Arc<OrderService<S>>,
        carts: Arc<CartService<S>>,
        inventory: Arc<dyn InventoryAdjuster>,
        coupons: Arc<dyn CouponRepository>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            orders,
            carts,
            inventory,
            coupons,
            payments,
            currency: "usd".to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    #[tracing::instrument(skip(self, request), fields(customer_id = ?caller.customer_id))]
    pub async fn checkout(
        &self,
        caller: &Caller,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_total").increment(1);
        let started = Instant::now();

        let result = self.run_checkout(caller, request).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        if let Err(err) = &result {
            metrics::counter!("checkout_failed_total").increment(1);
            tracing::warn!(error = %err, "checkout failed");
        }
        result
    }

    async fn run_checkout(
        &self,
        caller: &Caller,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt> {
        let snapshot = self.snapshot(caller, &request).await?;

        let mut place = PlaceOrder::new(
            snapshot.customer_id,
            request.email,
            snapshot.lines,
            snapshot.shipping_address,
        )
        .with_billing_address(request.billing_address)
        .with_coupon(snapshot.coupon);
        if let Some(method) = request.payment_method {
            place = place.with_payment_method(method);
        }

        let order_id = place.order_id;
        let order = self.orders.place_order(place).await?;

        let mut reserved = Vec::new();
        for reservation in order.stock_reservations() {
            if let Err(err) = self.inventory.reserve(&reservation).await {
                self.compensate(order_id, &reserved, &err.to_string()).await;
                return Err(err.into());
            }
            reserved.push(reservation);
        }
        tracing::info!(%order_id, lines = reserved.len(), "stock reserved");

        let handle = match self
            .payments
            .authorize(order.totals().total, &self.currency)
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                self.compensate(order_id, &reserved, &err.to_string()).await;
                return Err(err);
            }
        };

        let order = self
            .orders
            .record_payment_authorized(order_id, handle.intent_id.clone())
            .await?;

        if let Some(customer_id) = snapshot.customer_id
            && let Err(err) = self.carts.check_out(customer_id, order_id).await
        {
            tracing::warn!(%order_id, error = %err, "failed to clear cart after checkout");
        }

        tracing::info!(
            %order_id,
            order_number = %order.order_number(),
            intent_id = %handle.intent_id,
            "checkout completed"
        );
        Ok(CheckoutReceipt {
            order,
            client_secret: handle.client_secret,
        })
    }

    /// Approves a pending refund and pays it out through the gateway.
    #[tracing::instrument(skip(self))]
    pub async fn approve_refund(&self, caller: &Caller, cmd: ReviewRefund) -> Result<Order> {
        let order_id = cmd.order_id;
        self.orders.approve_refund(caller, cmd).await?;
        self.pay_out_refund(caller, order_id).await
    }

    /// Sends an approved refund to the gateway and records the payout.
    /// Already completed refunds are returned unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn pay_out_refund(&self, caller: &Caller, order_id: AggregateId) -> Result<Order> {
        caller.require_admin()?;
        let order = self.orders.get_order(caller, order_id).await?;

        let refund = match order.refund() {
            Some(refund) if refund.status == RefundStatus::Completed => return Ok(order),
            Some(refund) if refund.status == RefundStatus::Approved => refund,
            _ => {
                return Err(DomainError::from(OrderError::RefundNotInState {
                    expected: RefundStatus::Approved,
                })
                .into());
            }
        };
        let intent_id = order
            .payment()
            .intent_id
            .clone()
            .ok_or(CheckoutError::NoPaymentIntent(order_id))?;

        let reference = self.payments.refund(&intent_id, refund.amount).await?;
        metrics::counter!("refunds_paid_out_total").increment(1);

        Ok(self.orders.complete_refund(order_id, reference).await?)
    }

    async fn snapshot(&self, caller: &Caller, request: &CheckoutRequest) -> Result<Snapshot> {
        let requested_coupon = match &request.coupon_code {
            Some(code) => Some(
                self.coupons
                    .find_by_code(code)
                    .await?
                    .ok_or_else(|| CheckoutError::InvalidCoupon(code.clone()))?,
            ),
            None => None,
        };

        match caller.customer_id {
            Some(customer_id) => {
                let cart = self.carts.get_cart(customer_id).await?;
                if cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                let lines = cart
                    .items()
                    .iter()
                    .map(|item| OrderLine {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        variant: item.variant.clone(),
                    })
                    .collect();
                let shipping_address = request
                    .shipping_address
                    .clone()
                    .or_else(|| cart.shipping_address().cloned())
                    .ok_or(CheckoutError::MissingShippingAddress)?;

                Ok(Snapshot {
                    customer_id: Some(customer_id),
                    lines,
                    shipping_address,
                    coupon: requested_coupon.or_else(|| cart.coupon().cloned()),
                })
            }
            None => {
                if request.items.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                Ok(Snapshot {
                    customer_id: None,
                    lines: request.items.clone(),
                    shipping_address: request
                        .shipping_address
                        .clone()
                        .ok_or(CheckoutError::MissingShippingAddress)?,
                    coupon: requested_coupon,
                })
            }
        }
    }

    /// Releases what was reserved and cancels the order. Failures are logged;
    /// the stock releaser retries any release that did not land.
    async fn compensate(&self, order_id: AggregateId, reserved: &[StockReservation], reason: &str) {
        tracing::info!(%order_id, reserved = reserved.len(), "compensating checkout");

        for reservation in reserved.iter().rev() {
            if let Err(err) = self
                .inventory
                .release(reservation.product_id, &reservation.key)
                .await
            {
                tracing::error!(key = %reservation.key, error = %err, "compensation release failed");
            }
        }

        let note = format!("checkout failed: {reason}");
        if let Err(err) = self
            .orders
            .cancel(&Caller::admin(None), CancelOrder::new(order_id, Some(note)))
            .await
        {
            tracing::error!(%order_id, error = %err, "failed to cancel order after checkout failure");
        }
    }
}
