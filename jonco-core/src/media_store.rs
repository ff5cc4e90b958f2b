//! MediaStore: object storage for uploaded images and videos.
//!
//! Implementations handle a single bucket. Paths are produced by
//! `jonco_common::upload_policy` and are already validated.

use async_trait::async_trait;

/// Errors from object storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes under `path`. Fails if the object already exists.
    async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Public URL the site can link to for `path`.
    fn public_url(&self, path: &str) -> String;

    /// Time-limited URL the browser can upload `path` to directly.
    async fn signed_upload_url(&self, path: &str) -> Result<String, StorageError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{MediaStore, StorageError};

    /// A stored object, as recorded by [`MemoryMediaStore`].
    #[derive(Clone, Debug, PartialEq)]
    pub struct StoredObject {
        pub data: Vec<u8>,
        pub content_type: String,
    }

    /// In-memory store for tests. `fail_writes` makes every write fail.
    #[derive(Default)]
    pub struct MemoryMediaStore {
        objects: Mutex<HashMap<String, StoredObject>>,
        pub fail_writes: bool,
    }

    impl MemoryMediaStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn get(&self, path: &str) -> Option<StoredObject> {
            self.objects.lock().unwrap().get(path).cloned()
        }

        pub fn paths(&self) -> Vec<String> {
            let mut paths: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
            paths.sort();
            paths
        }
    }

    #[async_trait]
    impl MediaStore for MemoryMediaStore {
        async fn put(
            &self,
            path: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Storage(format!("put {path}: write refused")));
            }
            let mut objects = self.objects.lock().unwrap();
            if objects.contains_key(path) {
                return Err(StorageError::Storage(format!("put {path}: already exists")));
            }
            objects.insert(
                path.to_string(),
                StoredObject {
                    data,
                    content_type: content_type.to_string(),
                },
            );
            Ok(())
        }

        fn public_url(&self, path: &str) -> String {
            format!("memory://public/{path}")
        }

        async fn signed_upload_url(&self, path: &str) -> Result<String, StorageError> {
            if self.fail_writes {
                return Err(StorageError::Storage(format!("sign {path}: refused")));
            }
            Ok(format!("memory://upload/{path}?token=test"))
        }
    }
}
