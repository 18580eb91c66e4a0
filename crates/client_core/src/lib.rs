use std::{sync::Arc, time::Duration};

use catalog::Catalog;
use shared::{
    domain::{FilterSpec, Product, ProductId, PAGE_SIZE},
    protocol::{CartSnapshot, CatalogPage, Notice, StoreEvent},
};
use storage::SessionStore;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

pub mod cart;
pub mod error;
pub mod pending;
pub mod router;
pub mod session;

pub use cart::{CartEntry, CartLedger, QuantityChange};
pub use error::{CartError, FieldViolation, LoginError, StorefrontError};
pub use pending::{CommitOutcome, DelayedCommit, PendingSelection, DEFAULT_COMMIT_DELAY};
pub use session::{validate_login_form, Credentials, SessionConfig, SessionContext, SessionGate};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub page_size: usize,
    pub commit_delay: Duration,
    pub session: SessionConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            commit_delay: DEFAULT_COMMIT_DELAY,
            session: SessionConfig::default(),
        }
    }
}

/// One signed-in shopper's view of the store: filters, paging, confirmation buffer and cart.
///
/// State changes are pushed to subscribers as [`StoreEvent`]s; nothing re-renders implicitly.
pub struct Storefront {
    catalog: Arc<Catalog>,
    gate: SessionGate,
    session: SessionContext,
    config: StorefrontConfig,
    filters: FilterSpec,
    page: usize,
    cart: Arc<Mutex<CartLedger>>,
    pending: PendingSelection,
    inflight: Vec<DelayedCommit>,
    events: broadcast::Sender<StoreEvent>,
}

impl Storefront {
    /// Resumes a persisted sign-in; without one the shopper belongs on the login view.
    pub async fn open(
        catalog: Arc<Catalog>,
        store: Arc<dyn SessionStore>,
        config: StorefrontConfig,
    ) -> Result<Self, StorefrontError> {
        let gate = SessionGate::new(store, config.session.clone());
        let session = gate
            .restore()
            .await?
            .ok_or(StorefrontError::NotAuthenticated)?;
        Ok(Self::with_session(catalog, gate, session, config))
    }

    pub async fn sign_in(
        catalog: Arc<Catalog>,
        store: Arc<dyn SessionStore>,
        config: StorefrontConfig,
        username: &str,
        password: &str,
    ) -> Result<Self, StorefrontError> {
        let gate = SessionGate::new(store, config.session.clone());
        let session = gate.login(username, password).await?;
        Ok(Self::with_session(catalog, gate, session, config))
    }

    fn with_session(
        catalog: Arc<Catalog>,
        gate: SessionGate,
        session: SessionContext,
        config: StorefrontConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let cart = Arc::new(Mutex::new(CartLedger::new(Arc::clone(&catalog))));
        Self {
            catalog,
            gate,
            session,
            config,
            filters: FilterSpec::default(),
            page: 1,
            cart,
            pending: PendingSelection::default(),
            inflight: Vec::new(),
            events,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn current_page(&self) -> CatalogPage {
        self.catalog
            .query(&self.filters, self.page, self.config.page_size)
    }

    /// Replaces the filters wholesale and goes back to page 1.
    pub fn set_filters(&mut self, filters: FilterSpec) -> CatalogPage {
        self.filters = filters;
        self.page = 1;
        self.publish(StoreEvent::FiltersChanged {
            filters: self.filters.clone(),
        });
        self.refresh_catalog()
    }

    /// The page number is taken as given; out-of-range pages render empty.
    pub fn set_page(&mut self, page: usize) -> CatalogPage {
        self.page = page;
        self.refresh_catalog()
    }

    fn refresh_catalog(&self) -> CatalogPage {
        let page = self.current_page();
        debug!(page = page.page, items = page.items.len(), total = page.total_count, "catalog refreshed");
        self.publish(StoreEvent::CatalogUpdated { page: page.clone() });
        page
    }

    /// Parks a product in the confirmation buffer, replacing any earlier candidate.
    pub fn select_for_cart(&mut self, product_id: ProductId) -> Result<Product, StorefrontError> {
        let product = self
            .catalog
            .get(product_id)
            .cloned()
            .ok_or(CartError::UnknownProduct(product_id))?;
        self.pending.select(product.clone());
        self.publish(StoreEvent::PendingChanged {
            candidate: Some(product.clone()),
        });
        Ok(product)
    }

    pub fn pending(&self) -> Option<&Product> {
        self.pending.candidate()
    }

    pub fn cancel_pending(&mut self) -> Option<Product> {
        let dropped = self.pending.cancel();
        if dropped.is_some() {
            self.publish(StoreEvent::PendingChanged { candidate: None });
        }
        dropped
    }

    /// Schedules the pending product's cart add after the commit delay. Needs a Tokio runtime.
    pub fn confirm_pending(&mut self) -> Option<ProductId> {
        let product = self.pending.confirm()?;
        self.publish(StoreEvent::PendingChanged { candidate: None });
        self.inflight.retain(|commit| !commit.is_finished());

        let product_id = product.id;
        info!(%product_id, delay = ?self.config.commit_delay, "cart commit scheduled");
        self.inflight.push(DelayedCommit::spawn(
            Arc::clone(&self.cart),
            product,
            self.config.commit_delay,
            self.events.clone(),
        ));
        Some(product_id)
    }

    pub fn inflight_count(&self) -> usize {
        self.inflight.iter().filter(|c| !c.is_finished()).count()
    }

    /// Cancels every scheduled commit, as when the product view goes away.
    pub fn cancel_inflight(&mut self) -> usize {
        let mut cancelled = 0;
        for commit in &self.inflight {
            if !commit.is_finished() {
                commit.cancel();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(cancelled, "cart commits cancelled");
        }
        cancelled
    }

    /// Waits for every scheduled commit to land or be cancelled.
    pub async fn settle(&mut self) -> Vec<CommitOutcome> {
        let mut outcomes = Vec::with_capacity(self.inflight.len());
        for commit in self.inflight.drain(..) {
            outcomes.push(commit.join().await);
        }
        outcomes
    }

    /// Adds straight to the cart, skipping confirmation and delay.
    pub async fn add_to_cart(&self, product_id: ProductId) -> Result<u32, StorefrontError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or(CartError::UnknownProduct(product_id))?;
        let mut cart = self.cart.lock().await;
        let quantity = cart.add(product)?;
        self.publish(StoreEvent::CartUpdated {
            cart: cart.snapshot()?,
        });
        self.publish(StoreEvent::Notice(Notice::success(format!(
            "added {} to cart",
            product.name
        ))));
        Ok(quantity)
    }

    pub async fn set_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<QuantityChange, StorefrontError> {
        self.mutate_cart(|cart| cart.set_quantity(product_id, quantity))
            .await
    }

    pub async fn remove(&self, product_id: ProductId) -> Result<QuantityChange, StorefrontError> {
        self.mutate_cart(|cart| cart.remove(product_id)).await
    }

    pub async fn increment(&self, product_id: ProductId) -> Result<QuantityChange, StorefrontError> {
        self.mutate_cart(|cart| cart.increment(product_id)).await
    }

    pub async fn decrement(&self, product_id: ProductId) -> Result<QuantityChange, StorefrontError> {
        self.mutate_cart(|cart| cart.decrement(product_id)).await
    }

    async fn mutate_cart(
        &self,
        op: impl FnOnce(&mut CartLedger) -> QuantityChange,
    ) -> Result<QuantityChange, StorefrontError> {
        let mut cart = self.cart.lock().await;
        let change = op(&mut *cart);
        if change != QuantityChange::Unchanged {
            self.publish(StoreEvent::CartUpdated {
                cart: cart.snapshot()?,
            });
        }
        if change == QuantityChange::Removed {
            self.publish(StoreEvent::Notice(Notice::success("item removed from cart")));
        }
        Ok(change)
    }

    pub async fn cart(&self) -> Result<CartSnapshot, StorefrontError> {
        Ok(self.cart.lock().await.snapshot()?)
    }

    /// Ends the session: pending commits are cancelled, the sign-in is forgotten and the cart dropped.
    pub async fn logout(mut self) -> Result<(), StorefrontError> {
        self.cancel_inflight();
        self.settle().await;
        self.gate.logout(&self.session).await?;
        self.publish(StoreEvent::Notice(Notice::info("signed out")));
        self.publish(StoreEvent::SessionEnded {
            username: self.session.username.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
