//! In-process store. Holds secrets in a map and enforces the version
//! precondition atomically, which the AWS store cannot.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{CURRENT_STAGE, SecretId, SecretMetadata, SecretStore, SecretValue};
use crate::error::{AwssmError, Result};

struct StoredSecret {
    raw: String,
    version: u64,
    created: DateTime<Utc>,
    changed: DateTime<Utc>,
}

impl StoredSecret {
    fn new(raw: String) -> Self {
        let now = Utc::now();
        Self {
            raw,
            version: 1,
            created: now,
            changed: now,
        }
    }

    fn version_id(&self) -> String {
        format!("v{}", self.version)
    }
}

#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, StoredSecret>>,
    fetches: AtomicUsize,
    puts: AtomicUsize,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding, for setting up a store before sharing it.
    pub fn with_secret(mut self, name: &str, raw: &str) -> Self {
        self.secrets
            .get_mut()
            .insert(name.to_string(), StoredSecret::new(raw.to_string()));
        self
    }

    /// Create or overwrite a secret without touching the call counters.
    pub async fn insert(&self, name: &str, raw: &str) {
        let mut secrets = self.secrets.lock().await;
        match secrets.get_mut(name) {
            Some(existing) => {
                existing.raw = raw.to_string();
                existing.version += 1;
                existing.changed = Utc::now();
            }
            None => {
                secrets.insert(name.to_string(), StoredSecret::new(raw.to_string()));
            }
        }
    }

    /// Current body of a secret, without touching the call counters.
    pub async fn get(&self, name: &str) -> Option<String> {
        self.secrets.lock().await.get(name).map(|s| s.raw.clone())
    }

    /// Number of `fetch` calls served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `put` calls that reached the store, successful or not.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

fn not_found(secret: &SecretId) -> AwssmError {
    AwssmError::NotFound {
        secret: secret.to_string(),
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    fn kind(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, secret: &SecretId) -> Result<SecretValue> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let secrets = self.secrets.lock().await;
        let stored = secrets.get(secret.as_str()).ok_or_else(|| not_found(secret))?;
        Ok(SecretValue {
            raw: stored.raw.clone(),
            version_id: Some(stored.version_id()),
        })
    }

    async fn describe(&self, secret: &SecretId) -> Result<SecretMetadata> {
        let secrets = self.secrets.lock().await;
        let stored = secrets.get(secret.as_str()).ok_or_else(|| not_found(secret))?;

        let mut versions = BTreeMap::new();
        versions.insert(stored.version_id(), vec![CURRENT_STAGE.to_string()]);

        Ok(SecretMetadata {
            name: Some(secret.to_string()),
            arn: Some(format!("arn:memory:secretsmanager:local:secret:{}", secret)),
            created_date: Some(stored.created),
            last_changed_date: Some(stored.changed),
            versions,
            ..Default::default()
        })
    }

    async fn put(
        &self,
        secret: &SecretId,
        raw: &str,
        expected_version: Option<&str>,
    ) -> Result<Option<String>> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let mut secrets = self.secrets.lock().await;
        let stored = secrets
            .get_mut(secret.as_str())
            .ok_or_else(|| not_found(secret))?;

        if let Some(expected) = expected_version {
            let found = stored.version_id();
            if found != expected {
                return Err(AwssmError::VersionConflict {
                    secret: secret.to_string(),
                    expected: expected.to_string(),
                    found,
                });
            }
        }

        stored.raw = raw.to_string();
        stored.version += 1;
        stored.changed = Utc::now();
        Ok(Some(stored.version_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> SecretId {
        SecretId::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_missing_secret() {
        let store = MemorySecretStore::new();
        let err = store.fetch(&id("nope")).await.unwrap_err();
        assert!(matches!(err, AwssmError::NotFound { .. }));
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_put_bumps_version() {
        let store = MemorySecretStore::new().with_secret("app", "{}");
        let before = store.fetch(&id("app")).await.unwrap();
        assert_eq!(before.version_id.as_deref(), Some("v1"));

        let new_version = store
            .put(&id("app"), r#"{"a":"1"}"#, Some("v1"))
            .await
            .unwrap();
        assert_eq!(new_version.as_deref(), Some("v2"));
        assert_eq!(store.get("app").await.unwrap(), r#"{"a":"1"}"#);

        let metadata = store.describe(&id("app")).await.unwrap();
        assert_eq!(metadata.current_version(), Some("v2"));
    }

    #[tokio::test]
    async fn test_put_rejects_stale_version() {
        let store = MemorySecretStore::new().with_secret("app", "{}");
        store.insert("app", r#"{"other":"writer"}"#).await;

        let err = store.put(&id("app"), "{}", Some("v1")).await.unwrap_err();
        match err {
            AwssmError::VersionConflict {
                expected, found, ..
            } => {
                assert_eq!(expected, "v1");
                assert_eq!(found, "v2");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(store.get("app").await.unwrap(), r#"{"other":"writer"}"#);
    }

    #[tokio::test]
    async fn test_unconditional_put_overwrites() {
        let store = MemorySecretStore::new().with_secret("app", "{}");
        store.insert("app", r#"{"x":1}"#).await;
        store.put(&id("app"), r#"{"y":2}"#, None).await.unwrap();
        assert_eq!(store.get("app").await.unwrap(), r#"{"y":2}"#);
    }
}
