//! 测试共用的内存对象存储

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use cos_fs::{
    CosConfig, CosFilesystem, ListingPage, ObjectMetadata, ObjectStore, StorageError, Visibility,
};

pub const REGION: &str = "ap-guangzhou";
pub const BUCKET: &str = "test-1250000000";

/// 内存中的扁平对象存储，键按字典序排列，与 COS 列举顺序一致
#[derive(Default)]
pub struct MockStore {
    objects: Mutex<BTreeMap<String, (Bytes, ObjectMetadata)>>,
    acls: Mutex<BTreeMap<String, Visibility>>,
    /// 这些键的复制、删除会失败
    failing_copies: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    /// 截断页不返回续页标记
    drop_marker: Mutex<bool>,
    pub list_calls: AtomicUsize,
    pub copy_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_keys<I, S>(keys: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for key in keys {
            store.insert(key, Bytes::new());
        }
        store
    }

    pub fn insert(&self, key: impl Into<String>, content: impl Into<Bytes>) {
        let content = content.into();
        let metadata = ObjectMetadata {
            content_type: Some("application/octet-stream".to_string()),
            content_length: content.len() as u64,
            last_modified: None,
            etag: None,
        };
        self.insert_with_metadata(key, content, metadata);
    }

    pub fn insert_with_metadata(
        &self,
        key: impl Into<String>,
        content: impl Into<Bytes>,
        metadata: ObjectMetadata,
    ) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.into(), (content.into(), metadata));
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn content(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).map(|(c, _)| c.clone())
    }

    pub fn acl(&self, key: &str) -> Option<Visibility> {
        self.acls.lock().unwrap().get(key).copied()
    }

    pub fn fail_copy_of(&self, key: &str) {
        self.failing_copies.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }

    pub fn drop_markers(&self) {
        *self.drop_marker.lock().unwrap() = true;
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        content: Bytes,
    ) -> Result<(), StorageError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.insert(key, content);
        Ok(())
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        self.content(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn head_object(&self, _bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete_object(&self, _bucket: &str, key: &str) -> Result<(), StorageError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(StorageError::RequestFailed(format!("delete of {} refused", key)));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_objects(
        &self,
        _bucket: &str,
        marker: &str,
        max_keys: u32,
        prefix: &str,
    ) -> Result<ListingPage, StorageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| marker.is_empty() || key.as_str() > marker);

        let keys: Vec<String> = matching.by_ref().take(max_keys as usize).cloned().collect();
        let truncated = matching.next().is_some();
        let next_marker = if truncated && !*self.drop_marker.lock().unwrap() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListingPage {
            keys,
            next_marker,
            truncated,
        })
    }

    async fn copy_object(
        &self,
        _bucket: &str,
        dest_key: &str,
        source_url: &str,
    ) -> Result<(), StorageError> {
        self.copy_calls.fetch_add(1, Ordering::SeqCst);
        let source_key = source_url
            .split_once('/')
            .map(|(_, key)| key)
            .ok_or_else(|| StorageError::RequestFailed(format!("bad copy source {}", source_url)))?;

        if self.failing_copies.lock().unwrap().contains(source_key) {
            return Err(StorageError::RequestFailed(format!("copy of {} refused", source_key)));
        }

        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(source_key.to_string()))?;
        objects.insert(dest_key.to_string(), object);
        Ok(())
    }

    async fn get_object_acl(&self, _bucket: &str, key: &str) -> Result<Visibility, StorageError> {
        Ok(self.acl(key).unwrap_or_default())
    }

    async fn put_object_acl(
        &self,
        _bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        self.acls.lock().unwrap().insert(key.to_string(), visibility);
        Ok(())
    }

    fn temporary_url(
        &self,
        bucket: &str,
        key: &str,
        expires: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, StorageError> {
        let mut url = format!("https://{}.presigned/{}?expires={}", bucket, key, expires);
        for (k, v) in params {
            url.push_str(&format!("&{}={}", k, v));
        }
        Ok(url)
    }
}

pub fn config() -> CosConfig {
    CosConfig::new(REGION, BUCKET)
}

pub fn filesystem(store: &Arc<MockStore>) -> CosFilesystem {
    filesystem_with(config(), store)
}

pub fn filesystem_with(config: CosConfig, store: &Arc<MockStore>) -> CosFilesystem {
    let store: Arc<dyn ObjectStore> = store.clone();
    CosFilesystem::new(config, store).unwrap()
}

pub fn paths(entries: &[cos_fs::Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.path.as_str()).collect()
}
