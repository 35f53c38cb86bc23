//! Listing adapter for the gallery view

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, instrument};

use crate::object_store::{ObjectStore, StorageResult};

/// Hard cap on entries returned by a single listing
pub const MAX_LIST_KEYS: usize = 1000;

/// Characters left as-is in public URLs; `/` keeps key "directories" intact
const KEY_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Caller-facing view of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: i64,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Public URL, when a public base URL is configured
    pub public_url: Option<String>,
}

/// Result of one listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Objects, most recently modified first
    pub items: Vec<ObjectDescriptor>,
    /// Whether more objects exist than were returned
    pub truncated: bool,
}

/// Maps store listings into gallery entries
pub struct Gallery {
    store: Arc<dyn ObjectStore>,
    public_base_url: Option<String>,
    default_prefix: String,
}

impl Gallery {
    /// Creates the adapter
    ///
    /// # Arguments
    ///
    /// * `store` - Shared store client
    /// * `public_base_url` - Base URL objects are served from, if public
    /// * `default_prefix` - Prefix listed when the caller sends none
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        public_base_url: Option<String>,
        default_prefix: String,
    ) -> Self {
        Self {
            store,
            public_base_url: public_base_url.map(|base| base.trim_end_matches('/').to_string()),
            default_prefix,
        }
    }

    /// Lists up to `max_keys` objects under `prefix`, newest first
    ///
    /// `max_keys` is clamped to `1..=1000`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Listing` if the store call fails; no partial
    /// results are returned.
    #[instrument(skip(self))]
    pub async fn list(&self, prefix: Option<&str>, max_keys: Option<usize>) -> StorageResult<Listing> {
        let prefix = prefix.unwrap_or(&self.default_prefix);
        let max_keys = max_keys.unwrap_or(MAX_LIST_KEYS).clamp(1, MAX_LIST_KEYS);

        let page = self
            .store
            .list_objects(prefix, i32::try_from(max_keys).unwrap_or(i32::MAX))
            .await?;

        let mut objects = page.objects;
        objects.sort_by(|a, b| {
            Reverse(a.last_modified)
                .cmp(&Reverse(b.last_modified))
                .then_with(|| a.key.cmp(&b.key))
        });

        let truncated = page.is_truncated || objects.len() > max_keys;
        objects.truncate(max_keys);
        debug!(count = objects.len(), truncated, "listed objects");

        Ok(Listing {
            items: objects
                .into_iter()
                .map(|object| ObjectDescriptor {
                    public_url: self.public_url(&object.key),
                    key: object.key,
                    size: object.size,
                    last_modified: object.last_modified,
                })
                .collect(),
            truncated,
        })
    }

    /// Public URL of `key`, if a public base is configured
    #[must_use]
    pub fn public_url(&self, key: &str) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{base}/{}", utf8_percent_encode(key, KEY_PATH)))
    }
}
