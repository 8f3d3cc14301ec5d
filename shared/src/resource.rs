//! Locally held binary resources (QR images, downloaded files) addressed by
//! opaque object URLs. Every `acquire` must be matched by a `release`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const OBJECT_URL_PREFIX: &str = "blob:promptgen/";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectUrl(pub String);

impl ObjectUrl {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{OBJECT_URL_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResource {
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for LocalResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalResource")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRegistry {
    entries: BTreeMap<ObjectUrl, LocalResource>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, bytes: Vec<u8>, mime_type: impl Into<String>) -> ObjectUrl {
        let url = ObjectUrl::generate();
        self.entries.insert(
            url.clone(),
            LocalResource {
                mime_type: mime_type.into(),
                bytes,
            },
        );
        tracing::debug!(url = %url, live = self.entries.len(), "resource acquired");
        url
    }

    /// Revokes `url`. Returns false if it was already gone.
    pub fn release(&mut self, url: &ObjectUrl) -> bool {
        let released = self.entries.remove(url).is_some();
        if released {
            tracing::debug!(url = %url, live = self.entries.len(), "resource released");
        }
        released
    }

    #[must_use]
    pub fn get(&self, url: &ObjectUrl) -> Option<&LocalResource> {
        self.entries.get(url)
    }

    #[must_use]
    pub fn contains(&self, url: &ObjectUrl) -> bool {
        self.entries.contains_key(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_hands_out_distinct_blob_urls() {
        let mut registry = ResourceRegistry::new();
        let a = registry.acquire(vec![1], "image/png");
        let b = registry.acquire(vec![2], "image/png");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:promptgen/"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&b).map(|r| r.bytes.as_slice()), Some(&[2u8][..]));
    }

    #[test]
    fn release_is_idempotent() {
        let mut registry = ResourceRegistry::new();
        let url = registry.acquire(vec![0; 4], "application/octet-stream");
        assert!(registry.release(&url));
        assert!(!registry.release(&url));
        assert!(registry.is_empty());
        assert!(!registry.contains(&url));
    }
}
