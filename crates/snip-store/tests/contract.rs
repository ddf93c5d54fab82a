//! Behavior every backend must share, run against all three.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proptest::prelude::*;
use snip_store::{
    Context, DatastoreClient, EntityKey, FsStore, MemoryStore, RemoteStore, Snippet,
    SnippetStore, StoreError, StoreResult,
};
use tempfile::TempDir;

/// Map-backed stand-in for the external datastore.
#[derive(Default)]
struct FakeDatastore {
    entities: Mutex<HashMap<EntityKey, Vec<u8>>>,
}

#[async_trait]
impl DatastoreClient for FakeDatastore {
    async fn put(&self, _ctx: &Context, key: &EntityKey, entity: Vec<u8>) -> StoreResult<EntityKey> {
        self.entities.lock().unwrap().insert(key.clone(), entity);
        Ok(key.clone())
    }

    async fn get(&self, _ctx: &Context, key: &EntityKey) -> StoreResult<Vec<u8>> {
        self.entities
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

/// One instance of every backend. The `TempDir` keeps the fs root alive.
fn all_backends() -> (Vec<Arc<dyn SnippetStore>>, TempDir) {
    let dir = TempDir::new().unwrap();
    let stores: Vec<Arc<dyn SnippetStore>> = vec![
        Arc::new(MemoryStore::new()),
        Arc::new(FsStore::open(dir.path().join("snippet")).unwrap()),
        Arc::new(RemoteStore::new(Arc::new(FakeDatastore::default()))),
    ];
    (stores, dir)
}

#[tokio::test]
async fn roundtrip_on_every_backend() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();
    let body: Vec<u8> = (0..=255u8).collect();

    for store in &stores {
        store
            .put_snippet(&ctx, "ab1234", &Snippet::new(body.clone()))
            .await
            .unwrap();
        let snip = store.get_snippet(&ctx, "ab1234").await.unwrap();
        assert_eq!(snip.body, body, "backend {}", store.backend());
    }
}

#[tokio::test]
async fn absence_is_the_same_sentinel_everywhere() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();

    for store in &stores {
        let err = store.get_snippet(&ctx, "never-put").await.unwrap_err();
        assert!(
            matches!(err, StoreError::NotFound),
            "backend {} returned {err:?}",
            store.backend()
        );
    }
}

#[tokio::test]
async fn last_write_wins_everywhere() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();

    for store in &stores {
        store
            .put_snippet(&ctx, "ow1234", &Snippet::from("first"))
            .await
            .unwrap();
        store
            .put_snippet(&ctx, "ow1234", &Snippet::from("second"))
            .await
            .unwrap();
        let snip = store.get_snippet(&ctx, "ow1234").await.unwrap();
        assert_eq!(snip.as_bytes(), b"second", "backend {}", store.backend());
    }
}

#[tokio::test]
async fn shared_prefixes_do_not_collide() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();

    for store in &stores {
        store
            .put_snippet(&ctx, "ab1234", &Snippet::from("one"))
            .await
            .unwrap();
        store
            .put_snippet(&ctx, "ab5678", &Snippet::from("two"))
            .await
            .unwrap();
        assert_eq!(
            store.get_snippet(&ctx, "ab1234").await.unwrap().as_bytes(),
            b"one"
        );
        assert_eq!(
            store.get_snippet(&ctx, "ab5678").await.unwrap().as_bytes(),
            b"two"
        );
    }
}

#[tokio::test]
async fn empty_id_is_invalid_everywhere() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();

    for store in &stores {
        let err = store
            .put_snippet(&ctx, "", &Snippet::from("x"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidId { .. }),
            "backend {} returned {err:?}",
            store.backend()
        );
    }
}

#[tokio::test]
async fn derived_ids_work_everywhere() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();
    let snip = Snippet::from("fn main() {}");
    let id = snip.derive_id();

    for store in &stores {
        store.put_snippet(&ctx, &id, &snip).await.unwrap();
        assert_eq!(store.get_snippet(&ctx, &id).await.unwrap(), snip);
    }
}

#[tokio::test]
async fn concurrent_readers_see_consistent_values() {
    let (stores, _dir) = all_backends();
    let ctx = Context::background();
    let ids: Vec<String> = (0..8).map(|i| format!("cr{i:04}")).collect();

    for store in &stores {
        for id in &ids {
            store
                .put_snippet(&ctx, id, &Snippet::from(id.as_str()))
                .await
                .unwrap();
        }

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(store);
                let ids = ids.clone();
                tokio::spawn(async move {
                    let ctx = Context::background();
                    for id in &ids {
                        let snip = store.get_snippet(&ctx, id).await.unwrap();
                        assert_eq!(snip.as_bytes(), id.as_bytes());
                    }
                })
            })
            .collect();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{2,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_payload_roundtrips_on_every_backend(
        id in id_strategy(),
        body in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (stores, _dir) = all_backends();
        rt.block_on(async {
            let ctx = Context::background();
            for store in &stores {
                store.put_snippet(&ctx, &id, &Snippet::new(body.clone())).await.unwrap();
                let snip = store.get_snippet(&ctx, &id).await.unwrap();
                assert_eq!(&snip.body, &body, "backend {}", store.backend());
            }
        });
    }
}
