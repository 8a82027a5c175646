//! Cart aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId};
use event_store::Version;

use crate::address::Address;
use crate::aggregate::Aggregate;
use crate::catalog::{CatalogError, ProductSnapshot};
use crate::coupon::Coupon;
use crate::line_item::{LineItem, LineItemId, VariantSelector};
use crate::pricing::{self, PriceBreakdown};

use super::{CartError, CartEvent};

/// A customer's cart.
///
/// `totals` is never set directly: [`Cart::recompute`] derives it from the
/// items and coupon after every applied event.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    id: Option<AggregateId>,
    version: Version,
    customer_id: Option<CustomerId>,
    items: Vec<LineItem>,
    coupon: Option<Coupon>,
    shipping_address: Option<Address>,
    totals: PriceBreakdown,
    last_updated: Option<DateTime<Utc>>,
}

impl Aggregate for Cart {
    type Event = CartEvent;
    type Error = CartError;

    fn aggregate_type() -> &'static str {
        "Cart"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        let at = event.occurred_at();
        match event {
            CartEvent::CartOpened {
                cart_id,
                customer_id,
                ..
            } => {
                self.id = Some(cart_id);
                self.customer_id = Some(customer_id);
            }
            CartEvent::ItemAdded { item, .. } => self.items.push(item),
            CartEvent::ItemQuantityChanged {
                item_id, quantity, ..
            } => {
                if let Some(item) = self.items.iter_mut().find(|i| i.item_id == item_id) {
                    item.quantity = quantity;
                }
            }
            CartEvent::ItemRemoved { item_id, .. } => {
                self.items.retain(|i| i.item_id != item_id);
            }
            CartEvent::CartCleared { .. } | CartEvent::CartCheckedOut { .. } => {
                self.items.clear();
                self.coupon = None;
            }
            CartEvent::CouponApplied { coupon, .. } => self.coupon = Some(coupon),
            CartEvent::CouponRemoved { .. } => self.coupon = None,
            CartEvent::ShippingAddressSet { address, .. } => {
                self.shipping_address = Some(address);
            }
        }
        self.last_updated = Some(at);
        self.recompute();
    }
}

// Query methods
impl Cart {
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, item_id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    pub fn totals(&self) -> PriceBreakdown {
        self.totals
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    fn recompute(&mut self) {
        self.totals = pricing::quote(&self.items, self.coupon.as_ref());
    }
}

// Command methods (return events)
impl Cart {
    /// Opens the cart on first use; returns nothing if it already exists.
    pub fn open(
        &self,
        cart_id: AggregateId,
        customer_id: CustomerId,
        at: DateTime<Utc>,
    ) -> Vec<CartEvent> {
        if self.id.is_some() {
            return vec![];
        }
        vec![CartEvent::CartOpened {
            cart_id,
            customer_id,
            at,
        }]
    }

    /// Adds a product, or tops up the line that already holds the same
    /// product and variant. Quantities are clamped to the line's maximum.
    pub fn add_item(
        &self,
        product: &ProductSnapshot,
        quantity: u32,
        variant: Option<VariantSelector>,
        at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if !product.active {
            return Err(CartError::ProductInactive(product.id));
        }

        if let Some(existing) = self
            .items
            .iter()
            .find(|i| i.matches(product.id, variant.as_ref()))
        {
            let combined = existing.quantity.saturating_add(quantity);
            return Ok(vec![CartEvent::ItemQuantityChanged {
                item_id: existing.item_id,
                quantity: existing.clamp_quantity(combined),
                at,
            }]);
        }

        let max_quantity = product
            .max_quantity(variant.as_ref())
            .map_err(|err| match err {
                CatalogError::VariantNotFound(selector) => CartError::VariantNotFound(selector),
                _ => CartError::ProductNotFound(product.id),
            })?;
        if max_quantity == 0 {
            return Err(CartError::OutOfStock(product.id));
        }

        Ok(vec![CartEvent::ItemAdded {
            item: LineItem {
                item_id: LineItemId::new(),
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                image_url: product.image_url.clone(),
                quantity: quantity.min(max_quantity),
                max_quantity,
                variant,
            },
            at,
        }])
    }

    /// Sets a line's quantity, clamped to `[1, max_quantity]`.
    pub fn update_item_quantity(
        &self,
        item_id: LineItemId,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, CartError> {
        let item = self.item(item_id).ok_or(CartError::ItemNotFound(item_id))?;

        Ok(vec![CartEvent::ItemQuantityChanged {
            item_id,
            quantity: item.clamp_quantity(quantity),
            at,
        }])
    }

    pub fn remove_item(
        &self,
        item_id: LineItemId,
        at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, CartError> {
        if self.item(item_id).is_none() {
            return Err(CartError::ItemNotFound(item_id));
        }
        Ok(vec![CartEvent::ItemRemoved { item_id, at }])
    }

    pub fn clear(&self, at: DateTime<Utc>) -> Result<Vec<CartEvent>, CartError> {
        Ok(vec![CartEvent::CartCleared { at }])
    }

    /// Applies an already-resolved coupon, replacing any previous one.
    pub fn apply_coupon(
        &self,
        coupon: Coupon,
        at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, CartError> {
        Ok(vec![CartEvent::CouponApplied { coupon, at }])
    }

    pub fn remove_coupon(&self, at: DateTime<Utc>) -> Result<Vec<CartEvent>, CartError> {
        Ok(vec![CartEvent::CouponRemoved { at }])
    }

    pub fn set_shipping_address(
        &self,
        address: Address,
        at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, CartError> {
        address.validate()?;
        Ok(vec![CartEvent::ShippingAddressSet { address, at }])
    }

    /// Empties the cart once its contents have become an order.
    pub fn check_out(
        &self,
        order_id: AggregateId,
        at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(vec![CartEvent::CartCheckedOut { order_id, at }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::sample_address;
    use crate::catalog::Variant;
    use common::{Money, ProductId};
    use rust_decimal::Decimal;

    fn product(cents: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(),
            name: "Mug".to_string(),
            price: Money::from_cents(cents),
            image_url: Some("https://cdn.example/mug.png".to_string()),
            stock,
            variants: vec![],
            active: true,
        }
    }

    fn opened_cart() -> Cart {
        let mut cart = Cart::default();
        let events = cart.open(AggregateId::new(), CustomerId::new(), Utc::now());
        cart.apply_events(events);
        cart
    }

    fn run(cart: &mut Cart, command: impl FnOnce(&Cart) -> Result<Vec<CartEvent>, CartError>) {
        let events = command(cart).unwrap();
        cart.apply_events(events);
    }

    #[test]
    fn add_item_snapshots_product_and_recomputes() {
        let mut cart = opened_cart();
        let mug = product(1250, 50);

        run(&mut cart, |c| c.add_item(&mug, 2, None, Utc::now()));

        let line = &cart.items()[0];
        assert_eq!(line.name, "Mug");
        assert_eq!(line.unit_price, Money::from_cents(1250));
        assert_eq!(line.image_url.as_deref(), Some("https://cdn.example/mug.png"));
        assert_eq!(line.max_quantity, 10);
        assert_eq!(cart.totals().subtotal, Money::from_cents(2500));
        assert_eq!(cart.totals().shipping, Money::from_cents(599));
        assert!(cart.last_updated().is_some());
    }

    #[test]
    fn adding_same_product_and_variant_sums_and_clamps() {
        let mut cart = opened_cart();
        let mug = product(500, 7);

        run(&mut cart, |c| c.add_item(&mug, 4, None, Utc::now()));
        run(&mut cart, |c| c.add_item(&mug, 2, None, Utc::now()));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 6);

        run(&mut cart, |c| c.add_item(&mug, 5, None, Utc::now()));
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn different_variants_get_separate_lines() {
        let mut cart = opened_cart();
        let mut tee = product(2000, 0);
        tee.variants = vec![
            Variant {
                color: "red".to_string(),
                size: "M".to_string(),
                stock: 4,
            },
            Variant {
                color: "red".to_string(),
                size: "L".to_string(),
                stock: 4,
            },
        ];

        run(
            &mut cart,
            |c| c.add_item(&tee, 1, Some(VariantSelector::new("red", "M")), Utc::now()),
        );
        run(
            &mut cart,
            |c| c.add_item(&tee, 1, Some(VariantSelector::new("red", "L")), Utc::now()),
        );
        assert_eq!(cart.items().len(), 2);

        let err = cart
            .add_item(&tee, 1, Some(VariantSelector::new("blue", "M")), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CartError::VariantNotFound(_)));
    }

    #[test]
    fn rejects_inactive_out_of_stock_and_zero_quantity() {
        let cart = opened_cart();
        let mut mug = product(500, 3);

        assert!(matches!(
            cart.add_item(&mug, 0, None, Utc::now()),
            Err(CartError::InvalidQuantity(0))
        ));

        mug.active = false;
        assert!(matches!(
            cart.add_item(&mug, 1, None, Utc::now()),
            Err(CartError::ProductInactive(_))
        ));

        let empty = product(500, 0);
        assert!(matches!(
            cart.add_item(&empty, 1, None, Utc::now()),
            Err(CartError::OutOfStock(_))
        ));
    }

    #[test]
    fn update_quantity_clamps_into_range() {
        let mut cart = opened_cart();
        run(&mut cart, |c| c.add_item(&product(500, 4), 2, None, Utc::now()));
        let item_id = cart.items()[0].item_id;

        run(&mut cart, |c| c.update_item_quantity(item_id, 0, Utc::now()));
        assert_eq!(cart.items()[0].quantity, 1);

        run(&mut cart, |c| c.update_item_quantity(item_id, 99, Utc::now()));
        assert_eq!(cart.items()[0].quantity, 4);

        assert!(matches!(
            cart.update_item_quantity(LineItemId::new(), 1, Utc::now()),
            Err(CartError::ItemNotFound(_))
        ));
    }

    #[test]
    fn coupon_and_clear_recompute_totals() {
        let mut cart = opened_cart();
        run(&mut cart, |c| c.add_item(&product(2000, 20), 2, None, Utc::now()));
        run(&mut cart, |c| c.add_item(&product(1500, 20), 1, None, Utc::now()));
        run(
            &mut cart,
            |c| c.apply_coupon(
                Coupon::percentage("SAVE10", Decimal::new(10, 0)),
                Utc::now(),
            ),
        );

        assert_eq!(
            cart.totals().total,
            Money::from_decimal(Decimal::new(54175, 3))
        );

        run(&mut cart, |c| c.remove_coupon(Utc::now()));
        assert_eq!(cart.totals().discount, Money::zero());

        run(&mut cart, |c| c.clear(Utc::now()));
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), PriceBreakdown::default());
    }

    #[test]
    fn shipping_address_is_validated() {
        let mut cart = opened_cart();
        let mut address = sample_address();
        address.city = String::new();
        assert!(matches!(
            cart.set_shipping_address(address, Utc::now()),
            Err(CartError::InvalidAddress(_))
        ));

        run(
            &mut cart,
            |c| c.set_shipping_address(sample_address(), Utc::now()),
        );
        assert_eq!(cart.shipping_address(), Some(&sample_address()));
    }

    #[test]
    fn check_out_requires_items_and_empties_cart() {
        let mut cart = opened_cart();
        assert!(matches!(
            cart.check_out(AggregateId::new(), Utc::now()),
            Err(CartError::Empty)
        ));

        run(&mut cart, |c| c.add_item(&product(900, 5), 1, None, Utc::now()));
        run(&mut cart, |c| c.check_out(AggregateId::new(), Utc::now()));
        assert!(cart.is_empty());
    }
}
