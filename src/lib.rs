//! awssm - A CLI tool and library for editing individual keys of a JSON
//! secret stored in AWS Secrets Manager.
//!
//! The secret body is treated as a JSON object. Keys are addressed with
//! dotted paths and every change is an explicit insert (`add`) or an explicit
//! change (`update`/`remove`) of an existing key; there is no upsert.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use awssm::{AwsSecretStore, AwsSettings, KeyPath, SecretId, SecretSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = AwsSecretStore::connect(&AwsSettings::default()).await;
//!     let session = SecretSession::new(Arc::new(store), SecretId::new("prod/app")?);
//!
//!     let password = session.read_key(&KeyPath::parse("db.password")?).await?;
//!     println!("{}", password);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod session;
pub mod store;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use document::{KeyPath, SecretDocument};
pub use error::{AwssmError, Result};
pub use session::SecretSession;
pub use store::{
    AwsSecretStore, AwsSettings, MemorySecretStore, SecretId, SecretMetadata, SecretStore,
    SecretValue,
};
