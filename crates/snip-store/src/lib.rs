//! Pluggable persistence for snippets.
//!
//! A caller holds one [`SnippetStore`] and issues single-key puts and gets
//! against it without knowing which backend is behind it.
//!
//! # Storage Backends
//!
//! All backends implement the [`SnippetStore`] trait:
//!
//! - [`RemoteStore`] -- an external managed key-value service reached through
//!   a [`DatastoreClient`]; durability and consistency are the service's
//! - [`MemoryStore`] -- `RwLock<HashMap>` store for tests and ephemeral use
//! - [`FsStore`] -- one file per snippet under `{root}/{id[0..2]}/{id}`
//!
//! # Design Rules
//!
//! 1. A missing id is always [`StoreError::NotFound`], whatever the backend.
//! 2. Stored bytes are never aliased by caller buffers (copy in, copy out).
//! 3. No retries: every error reaches the immediate caller.
//! 4. Only network-bound backends observe the [`Context`].
//! 5. Single-key put and get only: no listing, deletion, or expiry.

pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod memory;
pub mod remote;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{open_store, Backend, FsConfig, RemoteConfig, StoreConfig};
pub use context::{CancelHandle, Context};
pub use error::{StoreError, StoreResult};
pub use fs::{FsStore, DEFAULT_ROOT};
pub use memory::MemoryStore;
pub use remote::{DatastoreClient, EntityKey, RemoteStore, SNIPPET_KIND};
pub use snip_types::Snippet;
pub use traits::SnippetStore;
