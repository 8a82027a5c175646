//! Domain layer for the storefront.
//!
//! This crate provides:
//! - the event-sourcing building blocks (`Aggregate`, `DomainEvent`,
//!   `CommandHandler`)
//! - the catalog, cart and order aggregates with their services
//! - pricing, coupons and caller access rules shared by those services

pub mod access;
pub mod address;
pub mod aggregate;
pub mod cart;
pub mod catalog;
pub mod command;
pub mod coupon;
pub mod error;
pub mod line_item;
pub mod order;
pub mod pricing;

pub use access::{Caller, Role};
pub use address::{Address, MissingAddressField};
pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{AddCartItem, Cart, CartError, CartEvent, CartService};
pub use catalog::{
    CatalogError, CatalogService, InventoryAdjuster, NewProduct, Product, ProductLookup,
    ProductSnapshot, ProductUpdate, StockReservation, Variant,
};
pub use command::{Command, CommandHandler, CommandResult};
pub use coupon::{Coupon, CouponRepository, DiscountKind, StaticCouponRepository};
pub use error::{DomainError, ErrorKind};
pub use line_item::{LineItem, LineItemId, MAX_QUANTITY_PER_ITEM, VariantSelector};
pub use order::{
    CancelOrder, Order, OrderError, OrderEvent, OrderLine, OrderNumber, OrderService, OrderStatus,
    OrderSummary, PaymentStatus, PlaceOrder, RequestRefund, ReviewRefund, UpdateOrderStatus,
};
pub use pricing::PriceBreakdown;
