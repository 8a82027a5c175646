//! Read model views.

pub mod customer_orders;
pub mod dashboard;

pub use customer_orders::{CustomerOrderRow, CustomerOrdersView};
pub use dashboard::{DashboardSnapshot, DashboardView};
