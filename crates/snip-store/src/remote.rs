//! Snippet store backed by an external managed key-value service.
//!
//! The service itself is opaque: it is reached through a [`DatastoreClient`]
//! that addresses entities by an [`EntityKey`] of `(kind, name)`. Snippets
//! are stored under kind [`SNIPPET_KIND`] with the caller's id as the name.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snip_types::{validate_id, Snippet};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::traits::SnippetStore;

/// Entity kind under which snippets are stored.
pub const SNIPPET_KIND: &str = "Snippet";

/// Two-part entity key: a kind tag and a unique name within that kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: String,
    pub name: String,
}

impl EntityKey {
    /// Build a key addressed by name.
    pub fn name_key(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Client for the external key-value service.
///
/// Implementations report a missing entity as [`StoreError::NotFound`] and
/// every other failure as [`StoreError::Service`] (or `Cancelled` /
/// `DeadlineExceeded` if they observe the context themselves). They should
/// honor the context they are given; [`RemoteStore`] additionally races each
/// call against it.
#[async_trait]
pub trait DatastoreClient: Send + Sync {
    /// Upsert the encoded entity under `key` and return the stored key.
    async fn put(&self, ctx: &Context, key: &EntityKey, entity: Vec<u8>) -> StoreResult<EntityKey>;

    /// Look up the encoded entity stored under `key`.
    async fn get(&self, ctx: &Context, key: &EntityKey) -> StoreResult<Vec<u8>>;
}

/// Durable, network-backed snippet store.
///
/// A stateless pass-through: no cache, no retry, no local lock. Every call is
/// one round trip, and service errors reach the caller unchanged.
pub struct RemoteStore {
    client: Arc<dyn DatastoreClient>,
    kind: String,
    timeout: Option<Duration>,
}

impl RemoteStore {
    /// Wrap a client, storing snippets under [`SNIPPET_KIND`].
    pub fn new(client: Arc<dyn DatastoreClient>) -> Self {
        Self {
            client,
            kind: SNIPPET_KIND.to_string(),
            timeout: None,
        }
    }

    /// Build a store from the `[remote]` configuration section.
    pub fn from_config(client: Arc<dyn DatastoreClient>, config: &RemoteConfig) -> Self {
        let store = Self::new(client).with_kind(config.kind.clone());
        match config.timeout_ms {
            Some(ms) => store.with_timeout(Duration::from_millis(ms)),
            None => store,
        }
    }

    /// Use a different entity kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Bound every call by `timeout`, on top of the caller's context.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The key a given id is stored under.
    pub fn key(&self, id: &str) -> EntityKey {
        EntityKey::name_key(self.kind.clone(), id)
    }

    fn call_context(&self, ctx: &Context) -> Context {
        match self.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.clone(),
        }
    }
}

#[async_trait]
impl SnippetStore for RemoteStore {
    async fn put_snippet(&self, ctx: &Context, id: &str, snippet: &Snippet) -> StoreResult<()> {
        validate_id(id)?;
        let key = self.key(id);
        let entity =
            bincode::serialize(snippet).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let ctx = self.call_context(ctx);
        ctx.run(self.client.put(&ctx, &key, entity)).await?;
        debug!(%key, size = snippet.len(), "stored snippet in datastore");
        Ok(())
    }

    async fn get_snippet(&self, ctx: &Context, id: &str) -> StoreResult<Snippet> {
        validate_id(id)?;
        let key = self.key(id);

        let ctx = self.call_context(ctx);
        let entity = ctx.run(self.client.get(&ctx, &key)).await?;
        let snippet: Snippet = bincode::deserialize(&entity)
            .map_err(|e| StoreError::Serialization(format!("entity {key}: {e}")))?;
        debug!(%key, size = snippet.len(), "read snippet from datastore");
        Ok(snippet)
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

impl fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStore")
            .field("kind", &self.kind)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
