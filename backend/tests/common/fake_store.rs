use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use upload_gateway::object_store::{
    ObjectPage, ObjectStore, ObjectSummary, PresignedUrl, StorageError, StorageResult,
};

/// A signing call observed by [`FakeStore`]
#[derive(Debug, Clone)]
pub struct SignCall {
    pub key: String,
    pub content_type: String,
    pub expires_in: Duration,
}

/// In-memory object store whose signed URLs point at a [`crate::common::FakeUpstream`]
pub struct FakeStore {
    upstream_base: String,
    objects: Vec<ObjectSummary>,
    fail_signing: bool,
    fail_listing: bool,
    ignore_max_keys: bool,
    sign_calls: Mutex<Vec<SignCall>>,
    list_calls: Mutex<Vec<(String, i32)>>,
}

impl FakeStore {
    pub fn new(upstream_base: impl Into<String>) -> Self {
        Self {
            upstream_base: upstream_base.into(),
            objects: Vec::new(),
            fail_signing: false,
            fail_listing: false,
            ignore_max_keys: false,
            sign_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_objects(mut self, objects: Vec<ObjectSummary>) -> Self {
        self.objects = objects;
        self
    }

    pub fn failing_signing(mut self) -> Self {
        self.fail_signing = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Returns every object regardless of the requested cap
    pub fn ignoring_max_keys(mut self) -> Self {
        self.ignore_max_keys = true;
        self
    }

    pub fn sign_calls(&self) -> Vec<SignCall> {
        self.sign_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<(String, i32)> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        if self.fail_signing {
            return Err(StorageError::Signing(
                "no credentials configured".to_string(),
            ));
        }

        self.sign_calls.lock().unwrap().push(SignCall {
            key: key.to_string(),
            content_type: content_type.to_string(),
            expires_in,
        });

        Ok(PresignedUrl {
            url: format!(
                "{}/test-bucket/{key}?X-Amz-Expires={}&X-Amz-Signature=fake",
                self.upstream_base,
                expires_in.as_secs()
            ),
            expires_at: Utc::now() + expires_in,
            expires_in,
        })
    }

    async fn list_objects(&self, prefix: &str, max_keys: i32) -> StorageResult<ObjectPage> {
        self.list_calls
            .lock()
            .unwrap()
            .push((prefix.to_string(), max_keys));

        if self.fail_listing {
            return Err(StorageError::Listing("AccessDenied".to_string()));
        }

        let matching: Vec<ObjectSummary> = self
            .objects
            .iter()
            .filter(|object| object.key.starts_with(prefix))
            .cloned()
            .collect();

        if self.ignore_max_keys {
            return Ok(ObjectPage {
                objects: matching,
                is_truncated: false,
            });
        }

        let cap = usize::try_from(max_keys).unwrap();
        let is_truncated = matching.len() > cap;
        Ok(ObjectPage {
            objects: matching.into_iter().take(cap).collect(),
            is_truncated,
        })
    }
}

/// Object summary with a timestamp `secs` after the epoch
pub fn object(key: &str, size: i64, secs: i64) -> ObjectSummary {
    ObjectSummary {
        key: key.to_string(),
        size,
        last_modified: Some(Utc.timestamp_opt(secs, 0).unwrap()),
    }
}
