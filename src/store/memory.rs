//! In-memory store for tests and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::store::ObjectStore;

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    fail_puts: AtomicBool,
}

impl MemoryStore {
    /// Insert an object directly, bypassing the capability trait.
    pub fn seed(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.objects
            .lock()
            .expect("store lock")
            .insert((bucket.to_string(), key.to_string()), body);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("store lock")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().expect("store lock").is_empty()
    }

    /// Make every subsequent `put` fail, for exercising write-error paths.
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }
}

impl ObjectStore for MemoryStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.get(bucket, key)
            .ok_or_else(|| anyhow!("object not found: {}/{}", bucket, key))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(anyhow!("puts disabled: {}/{}", bucket, key));
        }
        self.seed(bucket, key, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_fetch_round_trips() {
        let store = MemoryStore::default();
        store.put("b", "k", b"data".to_vec()).await.unwrap();
        assert_eq!(store.fetch("b", "k").await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn fetch_of_absent_object_errors() {
        let store = MemoryStore::default();
        assert!(store.fetch("b", "missing").await.is_err());
    }

    #[tokio::test]
    async fn fail_puts_rejects_writes() {
        let store = MemoryStore::default();
        store.fail_puts();
        assert!(store.put("b", "k", Vec::new()).await.is_err());
        assert!(store.is_empty());
    }
}
