use product_store::clients::ProductStoreClient;
use product_store::config::StoreConfig;
use product_store::framework::mock::{
    create_mock_api, expect_create, expect_list, expect_search, expect_update, ChannelApi,
    MockProductApi,
};
use product_store::framework::RemoteError;
use product_store::model::{Product, ProductDraft, ProductId, ProductPatch};
use product_store::store_actor::{self, RequestKind, StoreError};
use std::time::Duration;
use tokio::task::JoinHandle;

fn product(id: u64, title: &str) -> Product {
    Product {
        id: ProductId(id),
        title: title.to_string(),
        brand: "Acme".to_string(),
        description: format!("{} description", title),
        stock: 10,
        price: 9.99,
        rating: 4.0,
    }
}

fn start(api: ChannelApi) -> (ProductStoreClient, JoinHandle<()>) {
    let (store, client) = store_actor::new(api, &StoreConfig::default());
    (client, tokio::spawn(store.run()))
}

fn ids(products: &[Product]) -> Vec<u64> {
    products.iter().map(|p| p.id.0).collect()
}

/// Pattern 1: Store + expectation mock.
/// Answers arrive immediately, so each operation settles before the next starts.
#[tokio::test]
async fn test_load_all_is_idempotent() {
    let mut mock = MockProductApi::new();
    let catalog = vec![product(1, "Phone"), product(2, "Laptop")];
    mock.expect_list().return_ok(catalog.clone());
    mock.expect_list().return_ok(catalog.clone());

    let (client, handle) = start(mock.api());
    let view = client.subscribe();

    assert_eq!(client.load_all().await.unwrap(), catalog);
    let first = view.snapshot();
    client.load_all().await.unwrap();

    assert_eq!(view.snapshot(), first);
    assert_eq!(first.items, catalog);
    assert!(!first.loading);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_add_appends_server_record() {
    let mut mock = MockProductApi::new();
    mock.expect_list().return_ok(vec![product(1, "Phone")]);
    mock.expect_create().return_ok(product(42, "Tablet"));

    let (client, handle) = start(mock.api());
    client.load_all().await.unwrap();

    let added = client
        .add_product(ProductDraft {
            title: "Tablet".into(),
            stock: 10,
            price: 9.99,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(added.id, ProductId(42));
    assert_eq!(ids(&client.subscribe().items()), vec![1, 42]);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_update_replaces_entry_in_place() {
    let mut mock = MockProductApi::new();
    mock.expect_list()
        .return_ok(vec![product(1, "Phone"), product(2, "Laptop"), product(3, "Tablet")]);
    let mut restocked = product(2, "Laptop");
    restocked.stock = 0;
    mock.expect_update(ProductId(2)).return_ok(restocked.clone());

    let (client, handle) = start(mock.api());
    client.load_all().await.unwrap();
    let updated = client.update_stock(ProductId(2), 0).await.unwrap();

    assert_eq!(updated, restocked);
    let items = client.subscribe().items();
    assert_eq!(ids(&items), vec![1, 2, 3]);
    assert_eq!(items[1].stock, 0);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_update_of_unknown_id_still_returns_server_record() {
    let mut mock = MockProductApi::new();
    mock.expect_list().return_ok(vec![product(1, "Phone")]);
    mock.expect_update(ProductId(9)).return_ok(product(9, "Ghost"));

    let (client, handle) = start(mock.api());
    client.load_all().await.unwrap();
    let before = client.subscribe().snapshot();

    let returned = client.update_price(ProductId(9), 1.0).await.unwrap();

    assert_eq!(returned.id, ProductId(9));
    assert_eq!(client.subscribe().snapshot(), before);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_failed_load_keeps_items_and_clears_loading() {
    let mut mock = MockProductApi::new();
    mock.expect_list().return_ok(vec![product(1, "Phone")]);
    mock.expect_list().return_err(RemoteError::Status {
        status: 500,
        message: "Internal Server Error".into(),
    });

    let (client, handle) = start(mock.api());
    client.load_all().await.unwrap();

    let result = client.load_all().await;
    assert!(matches!(
        result,
        Err(StoreError::Remote(RemoteError::Status { status: 500, .. }))
    ));
    let state = client.subscribe().snapshot();
    assert_eq!(ids(&state.items), vec![1]);
    assert!(!state.loading);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_failed_add_and_update_leave_items_alone() {
    let mut mock = MockProductApi::new();
    mock.expect_list().return_ok(vec![product(1, "Phone")]);
    mock.expect_create().return_err(RemoteError::Network("timeout".into()));
    mock.expect_update(ProductId(1))
        .return_err(RemoteError::Rejected("price must not be negative".into()));

    let (client, handle) = start(mock.api());
    client.load_all().await.unwrap();
    let before = client.subscribe().snapshot();

    let add = client.add_product(ProductDraft::default()).await;
    assert!(matches!(add, Err(StoreError::Remote(RemoteError::Network(_)))));

    let update = client.update_price(ProductId(1), -5.0).await;
    let error = update.unwrap_err();
    assert!(error.is_user_visible());
    assert!(matches!(error, StoreError::Remote(RemoteError::Rejected(_))));

    assert_eq!(client.subscribe().snapshot(), before);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_invalid_server_payloads_are_not_applied() {
    let mut mock = MockProductApi::new();
    mock.expect_list().return_ok(vec![product(1, "Phone")]);
    let mut negative = product(2, "Broken");
    negative.price = -3.0;
    mock.expect_list().return_ok(vec![product(1, "Phone"), negative]);
    mock.expect_list()
        .return_ok(vec![product(1, "Phone"), product(1, "Phone again")]);
    let mut overrated = product(5, "Hyped");
    overrated.rating = 6.5;
    mock.expect_create().return_ok(overrated);

    let (client, handle) = start(mock.api());
    client.load_all().await.unwrap();

    for _ in 0..2 {
        let result = client.load_all().await;
        assert!(matches!(result, Err(StoreError::Remote(RemoteError::Decode(_)))));
    }
    let result = client.add_product(ProductDraft::default()).await;
    assert!(matches!(result, Err(StoreError::Remote(RemoteError::Decode(_)))));

    let state = client.subscribe().snapshot();
    assert_eq!(ids(&state.items), vec![1]);
    assert!(!state.loading);

    drop(client);
    handle.await.unwrap();
    mock.verify();
}

/// Pattern 2: Store + manual responders.
/// The test decides when each remote call settles.
#[tokio::test]
async fn test_loading_is_true_while_call_is_outstanding() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);
    let view = client.subscribe();
    assert!(!view.is_loading());

    let loader = client.clone();
    let load = tokio::spawn(async move { loader.load_all().await });

    let responder = expect_list(&mut calls).await.expect("Expected List call");
    assert!(view.is_loading());

    responder.send(Ok(vec![product(1, "Phone")])).unwrap();
    load.await.unwrap().unwrap();
    assert!(!view.is_loading());

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_newer_search_wins_when_it_settles_first() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);
    let view = client.subscribe();

    let c = client.clone();
    let old = tokio::spawn(async move { c.search("a").await });
    let (query, old_responder) = expect_search(&mut calls).await.expect("Expected Search call");
    assert_eq!(query, "a");

    let c = client.clone();
    let new = tokio::spawn(async move { c.search("ab").await });
    let (query, new_responder) = expect_search(&mut calls).await.expect("Expected Search call");
    assert_eq!(query, "ab");
    assert_eq!(view.filter_term(), "ab");

    new_responder.send(Ok(vec![product(2, "Abacus")])).unwrap();
    assert_eq!(ids(&new.await.unwrap().unwrap()), vec![2]);

    old_responder
        .send(Ok(vec![product(1, "Apple"), product(2, "Abacus")]))
        .unwrap();
    assert_eq!(
        old.await.unwrap(),
        Err(StoreError::Superseded(RequestKind::Search))
    );

    let state = view.snapshot();
    assert_eq!(ids(&state.items), vec![2]);
    assert_eq!(state.filter_term, "ab");
    assert!(!state.loading);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_stale_search_is_discarded_when_it_settles_first() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);
    let view = client.subscribe();

    let c = client.clone();
    let old = tokio::spawn(async move { c.search("a").await });
    let (_, old_responder) = expect_search(&mut calls).await.expect("Expected Search call");

    let c = client.clone();
    let new = tokio::spawn(async move { c.search("ab").await });
    let (_, new_responder) = expect_search(&mut calls).await.expect("Expected Search call");

    old_responder.send(Ok(vec![product(1, "Apple")])).unwrap();
    assert_eq!(
        old.await.unwrap(),
        Err(StoreError::Superseded(RequestKind::Search))
    );

    // The stale result never reached the state, and the newer search is still pending.
    let state = view.snapshot();
    assert!(state.items.is_empty());
    assert!(state.loading);

    new_responder.send(Ok(vec![product(2, "Abacus")])).unwrap();
    new.await.unwrap().unwrap();
    let state = view.snapshot();
    assert_eq!(ids(&state.items), vec![2]);
    assert!(!state.loading);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_stale_load_is_discarded_when_it_settles_last() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);
    let view = client.subscribe();

    let c = client.clone();
    let old = tokio::spawn(async move { c.load_all().await });
    let old_responder = expect_list(&mut calls).await.expect("Expected List call");

    let c = client.clone();
    let new = tokio::spawn(async move { c.load_all().await });
    let new_responder = expect_list(&mut calls).await.expect("Expected List call");

    new_responder
        .send(Ok(vec![product(1, "Phone"), product(2, "Laptop")]))
        .unwrap();
    assert_eq!(ids(&new.await.unwrap().unwrap()), vec![1, 2]);

    old_responder.send(Ok(vec![product(9, "Outdated")])).unwrap();
    assert_eq!(
        old.await.unwrap(),
        Err(StoreError::Superseded(RequestKind::Load))
    );

    let state = view.snapshot();
    assert_eq!(ids(&state.items), vec![1, 2]);
    assert!(!state.loading);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_local_filter_narrows_while_search_is_outstanding() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);
    let view = client.subscribe();

    let c = client.clone();
    let load = tokio::spawn(async move { c.load_all().await });
    expect_list(&mut calls)
        .await
        .expect("Expected List call")
        .send(Ok(vec![product(1, "iPhone 9"), product(2, "Samsung Universe 9")]))
        .unwrap();
    load.await.unwrap().unwrap();

    let c = client.clone();
    let search = tokio::spawn(async move { c.search("IPH").await });
    let (_, responder) = expect_search(&mut calls).await.expect("Expected Search call");

    assert_eq!(view.items().len(), 2);
    assert_eq!(ids(&view.filtered_products()), vec![1]);

    responder.send(Ok(vec![product(1, "iPhone 9")])).unwrap();
    search.await.unwrap().unwrap();
    assert_eq!(ids(&view.items()), vec![1]);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_newer_update_of_same_product_supersedes() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);

    let c = client.clone();
    let load = tokio::spawn(async move { c.load_all().await });
    expect_list(&mut calls)
        .await
        .expect("Expected List call")
        .send(Ok(vec![product(1, "Phone"), product(2, "Laptop")]))
        .unwrap();
    load.await.unwrap().unwrap();

    let c = client.clone();
    let first = tokio::spawn(async move { c.update_stock(ProductId(1), 5).await });
    let (_, _, first_responder) = expect_update(&mut calls).await.expect("Expected Update call");

    let c = client.clone();
    let other = tokio::spawn(async move { c.update_stock(ProductId(2), 7).await });
    let (id, patch, other_responder) =
        expect_update(&mut calls).await.expect("Expected Update call");
    assert_eq!(id, ProductId(2));
    assert_eq!(patch, ProductPatch::stock(7));

    let c = client.clone();
    let second = tokio::spawn(async move { c.update_stock(ProductId(1), 3).await });
    let (_, _, second_responder) = expect_update(&mut calls).await.expect("Expected Update call");

    let mut stock_3 = product(1, "Phone");
    stock_3.stock = 3;
    second_responder.send(Ok(stock_3)).unwrap();
    second.await.unwrap().unwrap();

    let mut stock_5 = product(1, "Phone");
    stock_5.stock = 5;
    first_responder.send(Ok(stock_5)).unwrap();
    assert_eq!(
        first.await.unwrap(),
        Err(StoreError::Superseded(RequestKind::Update))
    );

    // Updates of different products never supersede each other.
    let mut stock_7 = product(2, "Laptop");
    stock_7.stock = 7;
    other_responder.send(Ok(stock_7)).unwrap();
    other.await.unwrap().unwrap();

    let items = client.subscribe().items();
    assert_eq!(items[0].stock, 3);
    assert_eq!(items[1].stock, 7);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_concurrent_adds_are_all_applied() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);

    let c = client.clone();
    let first = tokio::spawn(async move { c.add_product(ProductDraft::default()).await });
    let (_, first_responder) = expect_create(&mut calls).await.expect("Expected Create call");

    let c = client.clone();
    let second = tokio::spawn(async move { c.add_product(ProductDraft::default()).await });
    let (_, second_responder) = expect_create(&mut calls).await.expect("Expected Create call");

    second_responder.send(Ok(product(8, "Second"))).unwrap();
    second.await.unwrap().unwrap();
    first_responder.send(Ok(product(7, "First"))).unwrap();
    first.await.unwrap().unwrap();

    let state = client.subscribe().snapshot();
    assert_eq!(ids(&state.items), vec![8, 7]);
    assert!(!state.loading);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_teardown_aborts_outstanding_calls() {
    let (api, mut calls) = create_mock_api(10);
    let (client, handle) = start(api);
    let mut view = client.subscribe();

    let c = client.clone();
    let search = tokio::spawn(async move { c.search("slow").await });
    let (_, mut responder) = expect_search(&mut calls).await.expect("Expected Search call");

    search.abort();
    let _ = search.await;
    drop(client);
    handle.await.unwrap();

    // The remote call was cancelled with the store, so nobody is listening any more.
    tokio::time::timeout(Duration::from_secs(1), responder.closed())
        .await
        .expect("Remote call still alive after teardown");
    assert_eq!(view.wait_for(|_| false).await, Err(StoreError::StoreClosed));
}

#[tokio::test]
async fn test_requests_after_shutdown_fail() {
    let (api, _calls) = create_mock_api(10);
    let (store, client) = store_actor::new(api, &StoreConfig::default());
    drop(store);

    assert_eq!(client.load_all().await, Err(StoreError::StoreClosed));
}

#[tokio::test]
async fn test_shutdown_token_stops_store_with_callers_waiting() {
    let (api, mut calls) = create_mock_api(10);
    let (store, client) = store_actor::new(api, &StoreConfig::default());
    let shutdown = store.shutdown_token();
    let handle = tokio::spawn(store.run());

    let c = client.clone();
    let load = tokio::spawn(async move { c.load_all().await });
    let mut responder = expect_list(&mut calls).await.expect("Expected List call");

    // Clients are still alive; only the token ends the loop.
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("Store did not stop")
        .unwrap();

    assert_eq!(load.await.unwrap(), Err(StoreError::StoreDropped));
    tokio::time::timeout(Duration::from_secs(1), responder.closed())
        .await
        .expect("Remote call still alive after shutdown");
    assert_eq!(client.load_all().await, Err(StoreError::StoreClosed));
}
