//! Foundation types for snip.
//!
//! Every store crate depends on `snip-types` for the unit of storage and the
//! rules a key has to satisfy.
//!
//! # Key Types
//!
//! - [`Snippet`] — an immutable byte payload, the unit of storage
//! - [`validate_id`] / [`validate_path_id`] — key preconditions
//! - [`shard_prefix`] — the two-character shard name for path-based layouts

pub mod error;
pub mod id;
pub mod snippet;

pub use error::TypesError;
pub use id::{shard_prefix, validate_id, validate_path_id, SHARD_PREFIX_LEN};
pub use snippet::{Snippet, DERIVED_ID_LEN};
