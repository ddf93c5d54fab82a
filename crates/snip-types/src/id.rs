//! Snippet id rules.
//!
//! Ids are opaque to every store, with two levels of strictness:
//!
//! - Any store: the id must be non-empty.
//! - Path-based stores: the id must also be at least [`SHARD_PREFIX_LEN`]
//!   characters (the prefix names the shard directory) and must be usable as
//!   a single path component: no `/`, `\` or NUL, and not `.` or `..`.

use crate::error::{Result, TypesError};

/// Number of leading characters used as the shard directory name.
pub const SHARD_PREFIX_LEN: usize = 2;

/// Characters that would let an id escape its shard directory.
const FORBIDDEN_PATH_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate an id for any store.
///
/// # Examples
///
/// ```
/// use snip_types::validate_id;
///
/// assert!(validate_id("x").is_ok());
/// assert!(validate_id("").is_err());
/// ```
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid(id, "id must not be empty"));
    }
    Ok(())
}

/// Validate an id that will be mapped onto a filesystem path.
///
/// # Examples
///
/// ```
/// use snip_types::validate_path_id;
///
/// assert!(validate_path_id("ab1234").is_ok());
/// assert!(validate_path_id("a").is_err());
/// assert!(validate_path_id("ab/../../etc").is_err());
/// ```
pub fn validate_path_id(id: &str) -> Result<()> {
    validate_id(id)?;

    if id.chars().count() < SHARD_PREFIX_LEN {
        return Err(invalid(
            id,
            &format!("id must be at least {SHARD_PREFIX_LEN} characters"),
        ));
    }

    for ch in FORBIDDEN_PATH_CHARS {
        if id.contains(*ch) {
            return Err(invalid(id, &format!("contains forbidden character: {ch:?}")));
        }
    }

    if id == ".." {
        return Err(invalid(id, "id must not be a relative path component"));
    }

    Ok(())
}

/// Return the shard directory name for a path id: its first
/// [`SHARD_PREFIX_LEN`] characters.
///
/// The prefix is taken on character boundaries, so multi-byte ids shard
/// cleanly.
pub fn shard_prefix(id: &str) -> Result<&str> {
    validate_path_id(id)?;
    let end = id
        .char_indices()
        .nth(SHARD_PREFIX_LEN)
        .map_or(id.len(), |(idx, _)| idx);
    let prefix = &id[..end];
    // "." and ".." as shard names would resolve outside the shard level.
    if prefix == "." || prefix == ".." {
        return Err(invalid(id, "shard prefix must not be a relative path component"));
    }
    Ok(prefix)
}

fn invalid(id: &str, reason: &str) -> TypesError {
    TypesError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
