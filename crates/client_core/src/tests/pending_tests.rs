use super::*;
use catalog::Catalog;

fn fixture_cart() -> (Arc<Catalog>, Arc<Mutex<CartLedger>>) {
    let catalog = Arc::new(Catalog::fixture());
    let cart = Arc::new(Mutex::new(CartLedger::new(Arc::clone(&catalog))));
    (catalog, cart)
}

fn fixture_product(catalog: &Catalog, id: i64) -> Product {
    catalog.get(ProductId(id)).cloned().expect("fixture product")
}

#[test]
fn selection_holds_a_single_candidate() {
    let catalog = Catalog::fixture();
    let mut pending = PendingSelection::default();
    assert!(pending.is_empty());

    assert_eq!(pending.select(fixture_product(&catalog, 1)), None);
    let replaced = pending.select(fixture_product(&catalog, 2));
    assert_eq!(replaced.map(|p| p.id), Some(ProductId(1)));
    assert_eq!(pending.candidate().map(|p| p.id), Some(ProductId(2)));

    assert_eq!(pending.confirm().map(|p| p.id), Some(ProductId(2)));
    assert!(pending.confirm().is_none());
}

#[test]
fn cancelling_discards_the_candidate() {
    let catalog = Catalog::fixture();
    let mut pending = PendingSelection::default();
    pending.select(fixture_product(&catalog, 3));
    assert_eq!(pending.cancel().map(|p| p.id), Some(ProductId(3)));
    assert!(pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn commit_applies_after_the_delay() {
    let (catalog, cart) = fixture_cart();
    let (events, mut rx) = broadcast::channel(16);
    let product = fixture_product(&catalog, 3);

    let commit = DelayedCommit::spawn(
        Arc::clone(&cart),
        product,
        DEFAULT_COMMIT_DELAY,
        events,
    );

    tokio::time::sleep(Duration::from_millis(799)).await;
    assert!(cart.lock().await.is_empty());

    assert_eq!(
        commit.join().await,
        CommitOutcome::Applied {
            product_id: ProductId(3),
            quantity: 1
        }
    );
    assert_eq!(cart.lock().await.quantity_of(ProductId(3)), Some(1));

    match rx.recv().await.expect("cart event") {
        StoreEvent::CartUpdated { cart } => assert_eq!(cart.total_price, 1899),
        other => panic!("unexpected event {other:?}"),
    }
    match rx.recv().await.expect("notice") {
        StoreEvent::Notice(notice) => assert!(notice.message.contains("AirPods Pro 2")),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_commit_leaves_cart_untouched() {
    let (catalog, cart) = fixture_cart();
    let (events, _rx) = broadcast::channel(16);

    let commit = DelayedCommit::spawn(
        Arc::clone(&cart),
        fixture_product(&catalog, 1),
        DEFAULT_COMMIT_DELAY,
        events,
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    commit.cancel();

    assert_eq!(
        commit.join().await,
        CommitOutcome::Cancelled {
            product_id: ProductId(1)
        }
    );
    tokio::time::sleep(DEFAULT_COMMIT_DELAY).await;
    assert!(cart.lock().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn repeated_commits_each_apply_their_own_add() {
    let (catalog, cart) = fixture_cart();
    let (events, _rx) = broadcast::channel(16);
    let product = fixture_product(&catalog, 6);

    let commits: Vec<DelayedCommit> = (0..3)
        .map(|_| {
            DelayedCommit::spawn(
                Arc::clone(&cart),
                product.clone(),
                DEFAULT_COMMIT_DELAY,
                events.clone(),
            )
        })
        .collect();
    for commit in commits {
        assert!(matches!(commit.join().await, CommitOutcome::Applied { .. }));
    }

    assert_eq!(cart.lock().await.quantity_of(ProductId(6)), Some(3));
}

#[tokio::test(start_paused = true)]
async fn commit_for_unknown_product_is_rejected() {
    let (catalog, cart) = fixture_cart();
    let (events, mut rx) = broadcast::channel(16);
    let mut stranger = fixture_product(&catalog, 1);
    stranger.id = ProductId(404);

    let commit = DelayedCommit::spawn(Arc::clone(&cart), stranger, Duration::ZERO, events);
    let outcome = commit.join().await;
    let expected = CommitOutcome::Rejected {
        product_id: ProductId(404),
        error: CartError::UnknownProduct(ProductId(404)),
    };
    assert_eq!(outcome, expected);
    // outcomes are handed out by value to several observers
    let copy = outcome.clone();
    assert_eq!(copy, expected);
    assert!(cart.lock().await.is_empty());
    assert!(matches!(rx.recv().await, Ok(StoreEvent::Error(_))));
}
