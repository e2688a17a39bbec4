//! Store traits for durable flag state.
//!
//! The registry depends on two narrow boundaries supplied by the
//! embedding application: a [`SettingsStore`] holding whole serialized
//! collections (the group collection, the published set) under fixed
//! keys, and a [`PreferenceStore`] holding each user's flag overrides.
//! Any durable key-value mechanism satisfies either contract.
//!
//! Group and publication mutations are read-modify-write over an
//! entire collection. That pattern is not safe under unsynchronized
//! concurrent writers of the same key: the embedder must serialize
//! them (per user id for preference writes) or updates are lost.

use crate::error::FeatureResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistent key-value store for serialized flag collections.
///
/// Values are opaque serialized collections; the adapter owns
/// durability, the registry owns the encoding. The registry always
/// reads and writes an entire collection under one key, never partial
/// records.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Get a JSON value.
    ///
    /// Returns `Ok(Some(value))` if the key exists, `Ok(None)` if it
    /// has never been written, or an error if the operation fails.
    async fn get_json(&self, key: &str) -> FeatureResult<Option<String>>;

    /// Set a JSON value, replacing any previous value.
    async fn set_json(&self, key: &str, value: String) -> FeatureResult<()>;
}

/// Per-user preference store for flag overrides.
///
/// Scoped by user id; an absent map is equivalent to an empty one.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get a user's flag overrides.
    async fn get_preferences(
        &self,
        user_id: &str,
    ) -> FeatureResult<Option<HashMap<String, bool>>>;

    /// Replace a user's flag overrides.
    async fn set_preferences(
        &self,
        user_id: &str,
        preferences: HashMap<String, bool>,
    ) -> FeatureResult<()>;
}

/// In-memory settings store for testing.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySettingsStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_json(&self, key: &str) -> FeatureResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set_json(&self, key: &str, value: String) -> FeatureResult<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// In-memory preference store for testing.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    preferences: RwLock<HashMap<String, HashMap<String, bool>>>,
}

impl InMemoryPreferenceStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get_preferences(
        &self,
        user_id: &str,
    ) -> FeatureResult<Option<HashMap<String, bool>>> {
        Ok(self.preferences.read().get(user_id).cloned())
    }

    async fn set_preferences(
        &self,
        user_id: &str,
        preferences: HashMap<String, bool>,
    ) -> FeatureResult<()> {
        self.preferences.write().insert(user_id.to_string(), preferences);
        Ok(())
    }
}
