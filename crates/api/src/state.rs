//! Shared application state and its wiring.

use std::sync::Arc;

use checkout::{CheckoutCoordinator, InMemoryPaymentGateway, PaymentGateway};
use domain::{
    CartService, CatalogService, CouponRepository, InventoryAdjuster, OrderService, ProductLookup,
    StaticCouponRepository,
};
use event_store::EventStore;
use projections::{
    CustomerOrdersView, DashboardView, LoggingNotifier, NotificationDispatcher, Notifier,
    ProjectionProcessor, StockReleaser,
};

/// The external collaborators the services are built around.
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub payments: Arc<dyn PaymentGateway>,
    pub coupons: Arc<dyn CouponRepository>,
    pub currency: String,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            notifier: Arc::new(LoggingNotifier),
            payments: Arc::new(InMemoryPaymentGateway::new()),
            coupons: Arc::new(StaticCouponRepository::default()),
            currency: "usd".to_string(),
        }
    }
}

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub catalog: Arc<CatalogService<S>>,
    pub carts: Arc<CartService<S>>,
    pub orders: Arc<OrderService<S>>,
    pub checkout: CheckoutCoordinator<S>,
    pub customer_orders: Arc<CustomerOrdersView>,
    pub dashboard: Arc<DashboardView>,
    pub processor: Arc<ProjectionProcessor<S>>,
}

impl<S: EventStore + Clone + 'static> AppState<S> {
    /// Builds every service over `store` and registers the read models and
    /// event reactions with a projection processor.
    ///
    /// Notifications are only sent for events appended after this call.
    pub async fn new(store: S, collaborators: Collaborators) -> projections::Result<Self> {
        let live_after = store.head_position().await?;

        let catalog = Arc::new(CatalogService::new(store.clone()));
        let lookup: Arc<dyn ProductLookup> = catalog.clone();
        let inventory: Arc<dyn InventoryAdjuster> = catalog.clone();

        let carts = Arc::new(CartService::new(
            store.clone(),
            lookup.clone(),
            collaborators.coupons.clone(),
        ));
        let orders = Arc::new(OrderService::new(store.clone(), lookup, inventory.clone()));
        let checkout = CheckoutCoordinator::new(
            orders.clone(),
            carts.clone(),
            inventory.clone(),
            collaborators.coupons,
            collaborators.payments,
        )
        .with_currency(collaborators.currency);

        let customer_orders = Arc::new(CustomerOrdersView::new());
        let dashboard = Arc::new(DashboardView::new());

        let mut processor = ProjectionProcessor::new(store);
        processor.register(customer_orders.clone());
        processor.register(dashboard.clone());
        processor.register(Arc::new(NotificationDispatcher::resuming_after(
            collaborators.notifier,
            live_after,
        )));
        processor.register(Arc::new(StockReleaser::new(inventory)));

        Ok(Self {
            catalog,
            carts,
            orders,
            checkout,
            customer_orders,
            dashboard,
            processor: Arc::new(processor),
        })
    }

    /// Brings the read models up to date with the log before a query.
    pub async fn refresh_views(&self) -> projections::Result<()> {
        self.processor.run_catch_up().await.map(|_| ())
    }
}
