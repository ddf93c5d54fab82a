use async_trait::async_trait;
use snip_types::Snippet;

use crate::context::Context;
use crate::error::StoreResult;

/// Keyed snippet persistence.
///
/// All implementations must satisfy these invariants:
/// - A put followed by a get of the same id on the same instance returns the
///   body byte-for-byte. The last put for an id wins.
/// - A get for an id that was never put fails with
///   [`StoreError::NotFound`](crate::StoreError::NotFound), the same value for
///   every backend.
/// - Puts and gets may be issued concurrently from many tasks.
/// - Stored state is never aliased by the caller's buffers.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Store `snippet` under `id`, replacing any previous value.
    async fn put_snippet(&self, ctx: &Context, id: &str, snippet: &Snippet) -> StoreResult<()>;

    /// Fetch the snippet stored under `id`.
    async fn get_snippet(&self, ctx: &Context, id: &str) -> StoreResult<Snippet>;

    /// Short backend name, used in logs.
    fn backend(&self) -> &'static str;
}
