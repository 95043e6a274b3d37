//! Remote secret stores: raw get/put/describe of a named secret body.

mod aws;
mod memory;

pub use aws::{AwsSecretStore, AwsSettings};
pub use memory::MemorySecretStore;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AwssmError, Result};

/// Staging label AWS attaches to the live version of a secret.
pub const CURRENT_STAGE: &str = "AWSCURRENT";

/// Name or ARN identifying a secret in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretId(String);

impl SecretId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AwssmError::MissingFlag("--secret"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw body of a secret and the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretValue {
    pub raw: String,
    pub version_id: Option<String>,
}

/// Descriptive metadata for a secret. Never includes the body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SecretMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    pub rotation_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_date: Option<DateTime<Utc>>,
    /// Version id -> staging labels.
    pub versions: BTreeMap<String, Vec<String>>,
    pub tags: BTreeMap<String, String>,
}

impl SecretMetadata {
    /// The version id carrying the `AWSCURRENT` label, if any.
    pub fn current_version(&self) -> Option<&str> {
        self.versions
            .iter()
            .find(|(_, stages)| stages.iter().any(|s| s == CURRENT_STAGE))
            .map(|(id, _)| id.as_str())
    }
}

/// A store holding secret bodies as opaque strings.
///
/// Every call goes to the store; nothing is cached between calls and no call
/// is retried.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Short name of the backend, for logs.
    fn kind(&self) -> &str;

    /// Fetch the current body and its version.
    async fn fetch(&self, secret: &SecretId) -> Result<SecretValue>;

    /// Fetch metadata without the body.
    async fn describe(&self, secret: &SecretId) -> Result<SecretMetadata>;

    /// Overwrite the body. With `expected_version`, reject the write if the
    /// current version is different. Returns the new version id when the
    /// store reports one.
    async fn put(
        &self,
        secret: &SecretId,
        raw: &str,
        expected_version: Option<&str>,
    ) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_id_rejects_blank() {
        assert!(SecretId::new("").is_err());
        assert!(SecretId::new("   ").is_err());
        assert_eq!(SecretId::new("prod/app").unwrap().as_str(), "prod/app");
    }

    #[test]
    fn test_current_version() {
        let mut metadata = SecretMetadata::default();
        metadata
            .versions
            .insert("old".to_string(), vec!["AWSPREVIOUS".to_string()]);
        assert_eq!(metadata.current_version(), None);

        metadata
            .versions
            .insert("new".to_string(), vec![CURRENT_STAGE.to_string()]);
        assert_eq!(metadata.current_version(), Some("new"));
    }
}
