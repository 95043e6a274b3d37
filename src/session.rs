//! The per-invocation context: one store, one secret, one read-modify-write
//! cycle.
//!
//! Each operation fetches the document exactly once and writes it back at
//! most once. Key-state errors are raised between the fetch and the write, so
//! a failed operation never reaches `put`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::document::{KeyPath, SecretDocument};
use crate::error::Result;
use crate::store::{SecretId, SecretMetadata, SecretStore};

pub struct SecretSession {
    store: Arc<dyn SecretStore>,
    secret: SecretId,
    verify_version: bool,
}

impl SecretSession {
    pub fn new(store: Arc<dyn SecretStore>, secret: SecretId) -> Self {
        Self {
            store,
            secret,
            verify_version: true,
        }
    }

    /// Whether `commit` asks the store to reject writes over a newer version.
    /// Enabled by default.
    pub fn with_version_check(mut self, enabled: bool) -> Self {
        if !enabled {
            warn!(
                secret = %self.secret,
                "version check disabled; concurrent writers can overwrite each other"
            );
        }
        self.verify_version = enabled;
        self
    }

    pub fn secret(&self) -> &SecretId {
        &self.secret
    }

    /// Fetch the current document.
    pub async fn open(&self) -> Result<SecretDocument> {
        debug!(secret = %self.secret, store = self.store.kind(), "fetching secret");
        let value = self.store.fetch(&self.secret).await?;
        Ok(SecretDocument::new(self.secret.clone(), value))
    }

    /// Write a modified document back. Unmodified documents are not written.
    pub async fn commit(&self, document: &SecretDocument) -> Result<()> {
        if !document.is_modified() {
            debug!(secret = %self.secret, "document unchanged, skipping write");
            return Ok(());
        }

        let expected = if self.verify_version {
            document.version_id()
        } else {
            None
        };

        let version = self
            .store
            .put(&self.secret, document.show(), expected)
            .await?;
        info!(
            secret = %self.secret,
            previous = ?document.version_id(),
            version = ?version,
            "secret updated"
        );
        Ok(())
    }

    /// Insert a new key. Fails with `KeyAlreadyExists` if it is present.
    pub async fn add_key(&self, path: &KeyPath, value: Value) -> Result<()> {
        let mut document = self.open().await?;
        document.add(path, value)?;
        self.commit(&document).await
    }

    /// Read an existing key. Fails with `KeyDoesNotExist` if it is absent.
    pub async fn read_key(&self, path: &KeyPath) -> Result<String> {
        self.open().await?.read(path)
    }

    /// Replace an existing key. Fails with `KeyDoesNotExist` if it is absent.
    pub async fn update_key(&self, path: &KeyPath, value: Value) -> Result<()> {
        let mut document = self.open().await?;
        document.update(path, value)?;
        self.commit(&document).await
    }

    /// Delete an existing key. Fails with `KeyDoesNotExist` if it is absent.
    pub async fn remove_key(&self, path: &KeyPath) -> Result<()> {
        let mut document = self.open().await?;
        document.remove(path)?;
        self.commit(&document).await
    }

    /// The raw document, verbatim.
    pub async fn show(&self) -> Result<String> {
        Ok(self.open().await?.show().to_string())
    }

    /// Store metadata for the secret. No body is fetched.
    pub async fn describe(&self) -> Result<SecretMetadata> {
        self.store.describe(&self.secret).await
    }
}
