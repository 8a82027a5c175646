//! Order service: placement, the status lifecycle and ownership checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::EventStore;

use crate::access::Caller;
use crate::catalog::{InventoryAdjuster, ProductLookup, StockReservation};
use crate::command::{Command, CommandHandler};
use crate::error::DomainError;
use crate::line_item::{LineItem, LineItemId, MAX_QUANTITY_PER_ITEM};

use super::{
    CancelOrder, DailyOrderSequence, Order, OrderError, OrderNumber, OrderStatus, OrderSummary,
    PaymentStatus, PlaceOrder, RequestRefund, ReviewRefund, UpdateOrderStatus, sequence_id,
};

/// Service for managing orders.
///
/// Every caller-facing method checks access first: customers act on their
/// own orders, administrators on any.
pub struct OrderService<S: EventStore> {
    handler: CommandHandler<S, Order>,
    sequences: CommandHandler<S, DailyOrderSequence>,
    catalog: Arc<dyn ProductLookup>,
    inventory: Arc<dyn InventoryAdjuster>,
}

impl<S: EventStore + Clone> OrderService<S> {
    pub fn new(
        store: S,
        catalog: Arc<dyn ProductLookup>,
        inventory: Arc<dyn InventoryAdjuster>,
    ) -> Self {
        Self {
            handler: CommandHandler::new(store.clone()),
            sequences: CommandHandler::new(store),
            catalog,
            inventory,
        }
    }
}

impl<S: EventStore> OrderService<S> {
    pub fn handler(&self) -> &CommandHandler<S, Order> {
        &self.handler
    }

    /// Prices the requested lines at live catalog prices, allocates an order
    /// number and records the order as `pending`.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<Order, DomainError> {
        if cmd.lines.is_empty() {
            return Err(OrderError::NoItems.into());
        }
        if cmd.email.trim().is_empty() {
            return Err(OrderError::EmailRequired.into());
        }
        cmd.shipping_address.validate().map_err(OrderError::from)?;

        let items = self.price_lines(&cmd).await?;
        let order_number = self.allocate_order_number(cmd.order_id, cmd.placed_at).await?;

        let result = self
            .handler
            .execute(cmd.aggregate_id(), |order| {
                order.place(order_number, &cmd, items)
            })
            .await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(
            order_number = %result.aggregate.order_number(),
            total = %result.aggregate.totals().total,
            "order placed"
        );
        Ok(result.aggregate)
    }

    /// Loads an order the caller may see.
    pub async fn get_order(
        &self,
        caller: &Caller,
        order_id: AggregateId,
    ) -> Result<Order, DomainError> {
        let order = self.load_live(order_id).await?;
        if !caller.can_access(order.customer_id()) {
            return Err(DomainError::Unauthorized(
                "order belongs to another customer".to_string(),
            ));
        }
        Ok(order)
    }

    pub async fn summary(
        &self,
        caller: &Caller,
        order_id: AggregateId,
    ) -> Result<OrderSummary, DomainError> {
        Ok(self.get_order(caller, order_id).await?.summary())
    }

    /// Administrator status change. `cancelled` goes through [`Self::cancel`];
    /// `refunded` is only reachable by approving a refund.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        caller: &Caller,
        cmd: UpdateOrderStatus,
    ) -> Result<Order, DomainError> {
        caller.require_admin()?;
        if cmd.status == OrderStatus::Cancelled {
            return self
                .cancel(caller, CancelOrder::new(cmd.order_id, cmd.note))
                .await;
        }
        self.load_live(cmd.order_id).await?;

        let result = self
            .handler
            .execute(cmd.aggregate_id(), |order| {
                order.update_status(cmd.status, cmd.note.clone(), Utc::now())
            })
            .await?;

        metrics::counter!("order_status_changes_total", "status" => cmd.status.as_str())
            .increment(1);
        Ok(result.aggregate)
    }

    /// Cancels the order and hands its stock back.
    ///
    /// The cancellation is recorded first; releases that fail here are
    /// retried from the event log by the stock releaser.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, caller: &Caller, cmd: CancelOrder) -> Result<Order, DomainError> {
        self.get_order(caller, cmd.order_id).await?;

        let result = self
            .handler
            .execute(cmd.aggregate_id(), |order| {
                order.cancel(cmd.reason.clone(), Utc::now())
            })
            .await?;

        self.release_stock(&result.aggregate.stock_reservations())
            .await;
        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(order_id = %cmd.order_id, "order cancelled");
        Ok(result.aggregate)
    }

    #[tracing::instrument(skip(self))]
    pub async fn request_refund(
        &self,
        caller: &Caller,
        cmd: RequestRefund,
    ) -> Result<Order, DomainError> {
        self.get_order(caller, cmd.order_id).await?;

        let result = self
            .handler
            .execute(cmd.aggregate_id(), |order| {
                order.request_refund(cmd.reason.clone(), cmd.amount, Utc::now())
            })
            .await?;

        metrics::counter!("refunds_requested_total").increment(1);
        Ok(result.aggregate)
    }

    /// Approves a pending refund; the order becomes `refunded`. Paying the
    /// money out is recorded separately with [`Self::complete_refund`].
    #[tracing::instrument(skip(self))]
    pub async fn approve_refund(
        &self,
        caller: &Caller,
        cmd: ReviewRefund,
    ) -> Result<Order, DomainError> {
        caller.require_admin()?;
        self.load_live(cmd.order_id).await?;

        let result = self
            .handler
            .execute(cmd.aggregate_id(), |order| {
                order.approve_refund(cmd.note.clone(), Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reject_refund(
        &self,
        caller: &Caller,
        cmd: ReviewRefund,
    ) -> Result<Order, DomainError> {
        caller.require_admin()?;
        self.load_live(cmd.order_id).await?;

        let result = self
            .handler
            .execute(cmd.aggregate_id(), |order| {
                order.reject_refund(cmd.note.clone(), Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }

    #[tracing::instrument(skip(self))]
    pub async fn complete_refund(
        &self,
        order_id: AggregateId,
        gateway_reference: String,
    ) -> Result<Order, DomainError> {
        self.load_live(order_id).await?;
        let result = self
            .handler
            .execute(order_id, |order| {
                order.complete_refund(gateway_reference, Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }

    /// Deletes a pending order on behalf of its owner and hands its stock back.
    #[tracing::instrument(skip(self))]
    pub async fn discard(&self, caller: &Caller, order_id: AggregateId) -> Result<(), DomainError> {
        let order = self.load_live(order_id).await?;
        if !caller.owns(order.customer_id()) {
            return Err(DomainError::Unauthorized(
                "only the customer who placed an order can delete it".to_string(),
            ));
        }

        let result = self
            .handler
            .execute(order_id, |order| order.discard(Utc::now()))
            .await?;

        self.release_stock(&result.aggregate.stock_reservations())
            .await;
        Ok(())
    }

    pub async fn record_payment_authorized(
        &self,
        order_id: AggregateId,
        intent_id: String,
    ) -> Result<Order, DomainError> {
        let result = self
            .handler
            .execute(order_id, |order| {
                order.record_payment_authorized(intent_id, Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }

    /// Records what the payment provider reported. The order status is not
    /// changed.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment_status(
        &self,
        order_id: AggregateId,
        intent_id: String,
        status: PaymentStatus,
    ) -> Result<Order, DomainError> {
        self.load_live(order_id).await?;
        let result = self
            .handler
            .execute(order_id, |order| {
                order.record_payment_status(intent_id, status, Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }

    async fn load_live(&self, order_id: AggregateId) -> Result<Order, DomainError> {
        match self.handler.load_existing(order_id).await? {
            Some(order) if !order.is_discarded() => Ok(order),
            _ => Err(DomainError::not_found("Order", order_id)),
        }
    }

    async fn price_lines(&self, cmd: &PlaceOrder) -> Result<Vec<LineItem>, DomainError> {
        let mut items = Vec::with_capacity(cmd.lines.len());
        for line in &cmd.lines {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity(line.quantity).into());
            }
            let product = self
                .catalog
                .find_product(line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(line.product_id))?;
            if !product.active {
                return Err(OrderError::ProductInactive(product.id).into());
            }
            if product.has_variants() && line.variant.is_none() {
                return Err(OrderError::VariantRequired(product.id).into());
            }
            // Order lines may oversell, so their cap is the per-item maximum
            // rather than the stock on hand.
            if product.max_quantity(line.variant.as_ref()).is_err() {
                return Err(match &line.variant {
                    Some(variant) => OrderError::VariantNotFound(variant.clone()),
                    None => OrderError::VariantRequired(product.id),
                }
                .into());
            }

            items.push(LineItem {
                item_id: LineItemId::new(),
                product_id: product.id,
                name: product.name,
                unit_price: product.price,
                image_url: product.image_url,
                quantity: line.quantity.min(MAX_QUANTITY_PER_ITEM),
                max_quantity: MAX_QUANTITY_PER_ITEM,
                variant: line.variant.clone(),
            });
        }
        Ok(items)
    }

    async fn allocate_order_number(
        &self,
        order_id: AggregateId,
        placed_at: DateTime<Utc>,
    ) -> Result<OrderNumber, DomainError> {
        let date = placed_at.date_naive();
        let result = self
            .sequences
            .execute_with_retry(sequence_id(date), |sequence| {
                sequence.allocate(date, order_id, Utc::now())
            })
            .await?;

        result
            .aggregate
            .last_number()
            .ok_or_else(|| DomainError::not_found("OrderNumberSequence", sequence_id(date)))
    }

    /// Releases each reservation, logging failures instead of returning them.
    async fn release_stock(&self, releases: &[StockReservation]) {
        for release in releases {
            if let Err(err) = self.inventory.release(release.product_id, &release.key).await {
                metrics::counter!("stock_release_failures_total").increment(1);
                tracing::warn!(
                    key = %release.key,
                    product_id = %release.product_id,
                    error = %err,
                    "stock release failed; will retry from the event log"
                );
            }
        }
    }
}
