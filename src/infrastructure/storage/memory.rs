//! In-memory [`ObjectStore`] used by the test suites.

use super::{keys, ByteWindow, ObjectMetadata, ObjectStore, ObjectStream};
use crate::common::error::AppError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

const BUCKET: &str = "media";
const BASE_URL: &str = "http://storage.test/media";
const CHUNK: usize = 4;

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    failing_uploads: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, body: impl Into<Bytes>, content_type: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body.into(), content_type.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).map(|(b, _)| b.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).map(|(_, ct)| ct.clone())
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Uploads to any key containing `fragment` fail.
    pub fn fail_uploads_matching(&self, fragment: &str) {
        self.failing_uploads.lock().unwrap().insert(fragment.to_string());
    }

    pub fn fail_deletes_matching(&self, fragment: &str) {
        self.failing_deletes.lock().unwrap().insert(fragment.to_string());
    }

    fn matches(set: &Mutex<HashSet<String>>, key: &str) -> bool {
        set.lock().unwrap().iter().any(|f| key.contains(f.as_str()))
    }

    fn lookup(&self, key: &str) -> Result<(Bytes, String), AppError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Object {}", key)))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(&self, body: Bytes, key: &str, content_type: &str) -> Result<String, AppError> {
        if Self::matches(&self.failing_uploads, key) {
            return Err(AppError::StoreFailure(format!("upload {}: injected failure", key)));
        }
        self.insert(key, body, content_type);
        Ok(self.public_url(key))
    }

    async fn download(&self, key: &str) -> Result<Bytes, AppError> {
        self.lookup(key).map(|(b, _)| b)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        if Self::matches(&self.failing_deletes, key) {
            return Err(AppError::StoreFailure(format!("delete {}: injected failure", key)));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, AppError> {
        let (body, content_type) = self.lookup(key)?;
        Ok(ObjectMetadata {
            size: body.len() as u64,
            content_type: if content_type.is_empty() { None } else { Some(content_type) },
            last_modified: None,
            etag: None,
        })
    }

    async fn open_range(&self, key: &str, window: Option<ByteWindow>) -> Result<ObjectStream, AppError> {
        let (body, _) = self.lookup(key)?;
        if body.is_empty() {
            return Err(AppError::EmptyObject(key.to_string()));
        }

        let slice = match window {
            Some(w) => {
                let end = (w.end as usize).min(body.len() - 1);
                body.slice(w.start as usize..=end)
            }
            None => body,
        };

        // Emit small chunks so consumers exercise real streaming.
        let chunks: Vec<std::io::Result<Bytes>> = (0..slice.len())
            .step_by(CHUNK)
            .map(|i| Ok(slice.slice(i..(i + CHUNK).min(slice.len()))))
            .collect();

        Ok(stream::iter(chunks).boxed())
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        Ok(format!("{}/{}?expires={}", BASE_URL, key, ttl.as_secs()))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", BASE_URL, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        keys::key_from_url(url, BASE_URL, Some(BUCKET))
    }
}
