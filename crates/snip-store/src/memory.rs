use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use snip_types::{validate_id, Snippet};
use tracing::debug;

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::traits::SnippetStore;

/// In-memory, HashMap-based snippet store.
///
/// Intended for tests and ephemeral use: contents live as long as the value.
/// A single `RwLock` guards the map, so gets run in parallel and a put
/// excludes everything else. Snippets are copied on the way in and out.
pub struct MemoryStore {
    snippets: RwLock<HashMap<String, Snippet>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            snippets: RwLock::new(HashMap::new()),
        }
    }

    /// Number of snippets currently stored.
    pub fn len(&self) -> usize {
        self.snippets.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snippets.read().expect("lock poisoned").is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnippetStore for MemoryStore {
    async fn put_snippet(&self, _ctx: &Context, id: &str, snippet: &Snippet) -> StoreResult<()> {
        validate_id(id)?;
        let copy = Snippet::new(snippet.body.clone());
        let mut map = self.snippets.write().expect("lock poisoned");
        map.insert(id.to_string(), copy);
        debug!(id, size = snippet.len(), "stored snippet in memory");
        Ok(())
    }

    async fn get_snippet(&self, _ctx: &Context, id: &str) -> StoreResult<Snippet> {
        validate_id(id)?;
        let map = self.snippets.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("snippet_count", &self.len())
            .finish()
    }
}
