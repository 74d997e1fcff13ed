// Concurrent writers to distinct and identical keys.

mod common;

use common::{Backends, seeded_bytes};
use futures::future::join_all;

#[tokio::test]
async fn test_concurrent_writes_to_distinct_keys() {
    let backends = Backends::new("https://media.test").await;
    for store in &backends.all {
        let writes = (0..50).map(|i| {
            let store = store.clone();
            async move {
                store
                    .put(&format!("users/u1/images/n{i}.png"), seeded_bytes(i, 512))
                    .await
            }
        });
        for result in join_all(writes).await {
            result.unwrap();
        }

        let keys = store.list("users/u1/images/").await.unwrap();
        assert_eq!(keys.len(), 50);
        assert_eq!(
            store.get("users/u1/images/n7.png").await.unwrap(),
            seeded_bytes(7, 512)
        );
    }
}

#[tokio::test]
async fn test_last_writer_wins_on_same_key() {
    let backends = Backends::new("https://media.test").await;
    for store in &backends.all {
        let key = "caches/note-pwa-v3/same";
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.put(key, seeded_bytes(i, 1024)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Whichever write landed last, the object is one complete payload.
        let data = store.get(key).await.unwrap();
        assert!((0..20).any(|i| data == seeded_bytes(i, 1024)));
        assert_eq!(store.list("caches/").await.unwrap(), vec![key]);
    }
}
