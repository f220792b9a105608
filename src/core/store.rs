//! Storage access for the app. Every domain operation takes an explicit
//! `&impl KeyValue` handle instead of opening a store behind the caller's
//! back, so the same logic runs against Spin's key-value store in the wasm
//! component and against an in-process map in the native binary and tests.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub trait KeyValue {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        self.set_raw(key, &serde_json::to_vec(value)?)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValue for spin_sdk::key_value::Store {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(spin_sdk::key_value::Store::get(self, key)?)
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        Ok(spin_sdk::key_value::Store::set(self, key, value)?)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        Ok(spin_sdk::key_value::Store::delete(self, key)?)
    }
}

/// Process-local store used by the native binary and by the test suite.
#[derive(Clone, Default)]
pub struct MemStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemStore {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().expect("store lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.remove(key);
        Ok(())
    }
}
