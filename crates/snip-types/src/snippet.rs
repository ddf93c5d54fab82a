use serde::{Deserialize, Serialize};

/// Length of the ids produced by [`Snippet::derive_id`].
pub const DERIVED_ID_LEN: usize = 11;

/// Domain tag mixed into content-derived ids.
const DERIVE_DOMAIN: &str = "snip-id-v1";

/// A binary blob stored under an external string key.
///
/// A snippet has no identity of its own. Stores copy the body on the way in
/// and on the way out, so neither the caller's buffer nor a returned value
/// aliases stored state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snippet {
    /// Raw payload.
    pub body: Vec<u8>,
}

impl Snippet {
    /// Create a snippet from anything convertible into a byte vector.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }

    /// Borrow the payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consume the snippet and return its payload.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Derive a short, stable id from the payload.
    ///
    /// The id is the first [`DERIVED_ID_LEN`] hex characters of a
    /// domain-separated BLAKE3 hash of the body. Identical bodies always map
    /// to the same id, and every derived id satisfies
    /// [`validate_path_id`](crate::validate_path_id).
    pub fn derive_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DERIVE_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(&self.body);
        let mut id = hex::encode(hasher.finalize().as_bytes());
        id.truncate(DERIVED_ID_LEN);
        id
    }
}

impl From<Vec<u8>> for Snippet {
    fn from(body: Vec<u8>) -> Self {
        Self { body }
    }
}

impl From<&[u8]> for Snippet {
    fn from(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
        }
    }
}

impl From<&str> for Snippet {
    fn from(body: &str) -> Self {
        Self {
            body: body.as_bytes().to_vec(),
        }
    }
}

impl AsRef<[u8]> for Snippet {
    fn as_ref(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::validate_path_id;
    use proptest::prelude::*;

    #[test]
    fn new_and_accessors() {
        let snip = Snippet::new(b"hello".to_vec());
        assert_eq!(snip.as_bytes(), b"hello");
        assert_eq!(snip.len(), 5);
        assert!(!snip.is_empty());
        assert_eq!(snip.into_body(), b"hello".to_vec());
    }

    #[test]
    fn default_is_empty() {
        let snip = Snippet::default();
        assert!(snip.is_empty());
        assert_eq!(snip.len(), 0);
    }

    #[test]
    fn conversions() {
        assert_eq!(Snippet::from("abc"), Snippet::new(b"abc".to_vec()));
        assert_eq!(Snippet::from(&b"abc"[..]), Snippet::new(b"abc".to_vec()));
        assert_eq!(Snippet::from(vec![1u8, 2, 3]).as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn derive_id_is_deterministic() {
        let a = Snippet::from("package main");
        let b = Snippet::from("package main");
        assert_eq!(a.derive_id(), b.derive_id());
    }

    #[test]
    fn derive_id_differs_for_different_bodies() {
        let a = Snippet::from("package main");
        let b = Snippet::from("package lib");
        assert_ne!(a.derive_id(), b.derive_id());
    }

    #[test]
    fn derive_id_shape() {
        let id = Snippet::from("x").derive_id();
        assert_eq!(id.len(), DERIVED_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn empty_body_still_derives_an_id() {
        let id = Snippet::default().derive_id();
        assert_eq!(id.len(), DERIVED_ID_LEN);
    }

    proptest! {
        #[test]
        fn derived_ids_are_always_valid_path_ids(body in proptest::collection::vec(any::<u8>(), 0..512)) {
            let id = Snippet::new(body).derive_id();
            prop_assert!(validate_path_id(&id).is_ok());
        }
    }
}
