//! Confirmation buffer in front of the cart and the delayed, cancellable commit behind it.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Product, ProductId},
    protocol::{Notice, StoreEvent},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{cart::CartLedger, error::CartError};

/// Default pause between confirming and the cart changing; the fly-to-cart animation runs meanwhile.
pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(800);

/// Holds at most one product awaiting a yes/no from the user.
#[derive(Debug, Clone, Default)]
pub struct PendingSelection {
    candidate: Option<Product>,
}

impl PendingSelection {
    /// Replaces the candidate, handing back whichever one was waiting.
    pub fn select(&mut self, product: Product) -> Option<Product> {
        self.candidate.replace(product)
    }

    pub fn candidate(&self) -> Option<&Product> {
        self.candidate.as_ref()
    }

    pub fn confirm(&mut self) -> Option<Product> {
        self.candidate.take()
    }

    pub fn cancel(&mut self) -> Option<Product> {
        self.candidate.take()
    }

    pub fn is_empty(&self) -> bool {
        self.candidate.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied { product_id: ProductId, quantity: u32 },
    Cancelled { product_id: ProductId },
    Rejected { product_id: ProductId, error: CartError },
}

pub struct DelayedCommit {
    product_id: ProductId,
    token: CancellationToken,
    task: JoinHandle<CommitOutcome>,
}

impl DelayedCommit {
    /// Waits `delay`, then adds `product` to `cart` unless cancelled first.
    pub fn spawn(
        cart: Arc<Mutex<CartLedger>>,
        product: Product,
        delay: Duration,
        events: broadcast::Sender<StoreEvent>,
    ) -> Self {
        let product_id = product.id;
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    debug!(%product_id, "cart commit cancelled");
                    CommitOutcome::Cancelled { product_id }
                }
                _ = tokio::time::sleep(delay) => apply(&cart, &product, &events).await,
            }
        });

        Self {
            product_id,
            token,
            task,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> CommitOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(product_id = %self.product_id, error = %err, "cart commit task aborted");
                CommitOutcome::Cancelled {
                    product_id: self.product_id,
                }
            }
        }
    }
}

async fn apply(
    cart: &Mutex<CartLedger>,
    product: &Product,
    events: &broadcast::Sender<StoreEvent>,
) -> CommitOutcome {
    let mut ledger = cart.lock().await;
    let quantity = match ledger.add(product) {
        Ok(quantity) => quantity,
        Err(error) => {
            warn!(product_id = %product.id, %error, "cart commit rejected");
            let _ = events.send(StoreEvent::Error((&error).into()));
            return CommitOutcome::Rejected {
                product_id: product.id,
                error,
            };
        }
    };

    info!(product_id = %product.id, quantity, "cart commit applied");
    match ledger.snapshot() {
        Ok(cart) => {
            let _ = events.send(StoreEvent::CartUpdated { cart });
        }
        Err(error) => {
            let _ = events.send(StoreEvent::Error((&error).into()));
        }
    }
    let _ = events.send(StoreEvent::Notice(Notice::success(format!(
        "added {} to cart",
        product.name
    ))));

    CommitOutcome::Applied {
        product_id: product.id,
        quantity,
    }
}

#[cfg(test)]
#[path = "tests/pending_tests.rs"]
mod tests;
