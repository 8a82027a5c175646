//! Event reactions and read models.
//!
//! This crate feeds the global event log to handlers:
//! - [`Projection`] trait for anything that consumes stored events
//! - [`ProjectionProcessor`] delivering events from a per-handler checkpoint
//! - Reactions: [`NotificationDispatcher`], [`StockReleaser`]
//! - Read models: [`CustomerOrdersView`], [`DashboardView`]

pub mod error;
pub mod notifier;
pub mod processor;
pub mod projection;
pub mod reactions;
pub mod views;

pub use error::{ProjectionError, Result};
pub use notifier::{InMemoryNotifier, LoggingNotifier, Notification, Notifier};
pub use processor::ProjectionProcessor;
pub use projection::Projection;
pub use reactions::{NotificationDispatcher, StockReleaser};
pub use views::{CustomerOrderRow, CustomerOrdersView, DashboardSnapshot, DashboardView};
