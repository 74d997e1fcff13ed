// Live snapshot delivery.

mod common;

use common::{owner, store, text_write};
use futures::StreamExt;
use jotpad_core::NotePatch;
use jotpad_docstore::{DocumentStore, NoteRepo};
use std::time::Duration;

#[tokio::test]
async fn test_first_snapshot_is_current_collection() {
    let store = store().await;
    let uid = owner("u1");
    let id = store.generate_id();
    store.set_note(&uid, text_write(&id, "before")).await.unwrap();

    let mut sub = store.subscribe(&uid).await.unwrap();
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].text, "before");
}

#[tokio::test]
async fn test_every_mutation_delivers_full_snapshot() {
    let store = store().await;
    let uid = owner("u1");
    let mut sub = store.subscribe(&uid).await.unwrap();
    assert!(sub.next().await.unwrap().is_empty());

    let a = store.generate_id();
    let b = store.generate_id();
    store.set_note(&uid, text_write(&a, "a")).await.unwrap();
    assert_eq!(sub.next().await.unwrap().len(), 1);

    store.set_note(&uid, text_write(&b, "b")).await.unwrap();
    assert_eq!(sub.next().await.unwrap().len(), 2);

    store
        .merge_note(&uid, &a, NotePatch::pinned(true))
        .await
        .unwrap();
    let snapshot = sub.next().await.unwrap();
    assert!(snapshot.iter().any(|n| n.id == a && n.pinned));

    store.delete_note(&uid, &a).await.unwrap();
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, b);
}

#[tokio::test]
async fn test_slow_consumer_sees_latest_snapshot() {
    let store = store().await;
    let uid = owner("u1");
    let mut sub = store.subscribe(&uid).await.unwrap();
    sub.next().await.unwrap();

    for i in 0..5 {
        let id = store.generate_id();
        store
            .set_note(&uid, text_write(&id, &format!("n{i}")))
            .await
            .unwrap();
    }

    assert_eq!(sub.next().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_other_owners_do_not_wake_subscriber() {
    let store = store().await;
    let mut sub = store.subscribe(&owner("alice")).await.unwrap();
    sub.next().await.unwrap();

    let id = store.generate_id();
    store
        .set_note(&owner("bob"), text_write(&id, "not yours"))
        .await
        .unwrap();

    let woke = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
    assert!(woke.is_err(), "alice was notified about bob's write");
}

#[tokio::test]
async fn test_two_subscribers_share_updates() {
    let store = store().await;
    let uid = owner("u1");
    let mut first = store.subscribe(&uid).await.unwrap();
    let second = store.subscribe(&uid).await.unwrap();
    first.next().await.unwrap();

    let mut stream = Box::pin(second.into_stream());
    assert!(stream.next().await.unwrap().is_empty());

    let id = store.generate_id();
    store.set_note(&uid, text_write(&id, "shared")).await.unwrap();

    assert_eq!(first.next().await.unwrap().len(), 1);
    assert_eq!(stream.next().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resubscribe_after_drop() {
    let store = store().await;
    let uid = owner("u1");
    drop(store.subscribe(&uid).await.unwrap());

    // The stale channel is pruned on the next write.
    let id = store.generate_id();
    store.set_note(&uid, text_write(&id, "x")).await.unwrap();

    let mut sub = store.subscribe(&uid).await.unwrap();
    assert_eq!(sub.next().await.unwrap().len(), 1);
}
