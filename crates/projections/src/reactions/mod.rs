//! Side-effecting reactions to order events.

mod notifications;
mod stock_releaser;

pub use notifications::NotificationDispatcher;
pub use stock_releaser::StockReleaser;
