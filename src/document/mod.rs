//! In-memory view of one fetched secret document.
//!
//! The raw string fetched from the store is the canonical state. Every key
//! operation parses it and checks the existence precondition. A mutation
//! then splices only the target span of the raw string, so the bytes of every
//! other key stay as they were. A failed operation never touches the raw
//! string, so the document is unchanged after any error.

mod edit;
mod path;

pub use path::KeyPath;

use serde_json::Value;

use crate::error::{AwssmError, Result};
use crate::store::{SecretId, SecretValue};
use path::array_index;

/// A secret body plus the identity and version it was fetched with.
#[derive(Debug, Clone)]
pub struct SecretDocument {
    secret: SecretId,
    raw: String,
    version_id: Option<String>,
    modified: bool,
}

impl SecretDocument {
    pub fn new(secret: SecretId, value: SecretValue) -> Self {
        Self {
            secret,
            raw: value.raw,
            version_id: value.version_id,
            modified: false,
        }
    }

    pub fn secret(&self) -> &SecretId {
        &self.secret
    }

    /// Version token of the body this document was fetched from.
    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// True once an add, update or remove has succeeded.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The raw document, verbatim. Never parses, never fails.
    pub fn show(&self) -> &str {
        &self.raw
    }

    /// Whether `path` resolves to a value (including `null`).
    pub fn key_exists(&self, path: &KeyPath) -> Result<bool> {
        let tree = self.parse()?;
        Ok(lookup(&tree, path.segments()).is_some())
    }

    /// Read the value at `path` as a string.
    ///
    /// Strings come back unquoted, `null` as the empty string, numbers and
    /// booleans as their literal text, and containers as compact JSON.
    pub fn read(&self, path: &KeyPath) -> Result<String> {
        let tree = self.parse()?;
        let value = lookup(&tree, path.segments()).ok_or_else(|| self.does_not_exist(path))?;

        Ok(match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Insert `value` at `path`. Fails if the key already exists.
    pub fn add(&mut self, path: &KeyPath, value: Value) -> Result<()> {
        let tree = self.parse()?;
        if lookup(&tree, path.segments()).is_some() {
            return Err(AwssmError::KeyAlreadyExists {
                secret: self.secret.to_string(),
                key: path.to_string(),
            });
        }

        let text = serde_json::to_string(&value)?;
        let edit = edit::insert_member(&self.raw, path.segments(), &text)
            .map_err(|msg| self.malformed(msg))?;
        self.apply(edit)
    }

    /// Replace the value at `path`. Fails if the key does not exist.
    pub fn update(&mut self, path: &KeyPath, value: Value) -> Result<()> {
        let tree = self.parse()?;
        if lookup(&tree, path.segments()).is_none() {
            return Err(self.does_not_exist(path));
        }

        let text = serde_json::to_string(&value)?;
        let edit = edit::replace_value(&self.raw, path.segments(), text)
            .map_err(|msg| self.malformed(msg))?;
        self.apply(edit)
    }

    /// Delete the key at `path`. Fails if the key does not exist.
    pub fn remove(&mut self, path: &KeyPath) -> Result<()> {
        let tree = self.parse()?;
        if lookup(&tree, path.segments()).is_none() {
            return Err(self.does_not_exist(path));
        }

        let edit = edit::remove_member(&self.raw, path.segments()).map_err(|msg| {
            self.malformed(format!("could not delete key \"{}\": {}", path, msg))
        })?;
        self.apply(edit)
    }

    /// Parse the raw body, requiring a JSON object at the root.
    fn parse(&self) -> Result<Value> {
        let tree: Value = serde_json::from_str(&self.raw)
            .map_err(|e| self.malformed(format!("not valid JSON: {}", e)))?;

        if !tree.is_object() {
            return Err(self.malformed(format!(
                "document root must be a JSON object, found {}",
                kind_of(&tree)
            )));
        }
        Ok(tree)
    }

    /// Splice an edit into the raw body. The result must still parse.
    fn apply(&mut self, edit: edit::Edit) -> Result<()> {
        let raw = edit.apply(&self.raw);
        serde_json::from_str::<serde::de::IgnoredAny>(&raw)
            .map_err(|e| self.malformed(format!("edit produced invalid JSON: {}", e)))?;
        self.raw = raw;
        self.modified = true;
        Ok(())
    }

    fn does_not_exist(&self, path: &KeyPath) -> AwssmError {
        AwssmError::KeyDoesNotExist {
            secret: self.secret.to_string(),
            key: path.to_string(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> AwssmError {
        AwssmError::malformed(self.secret.as_str(), message)
    }
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => array_index(segment).and_then(|idx| items.get(idx)),
        _ => None,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
