//! Command handlers for the awssm CLI.
//!
//! Arguments are validated into an [`Operation`] before any store is
//! contacted; the handlers then run the operation against a session.

mod inspect;
mod mutate;

pub use inspect::{handle_describe, handle_read, handle_show};
pub use mutate::{handle_add, handle_remove, handle_update};

use serde_json::Value;

use crate::cli::{Commands, ValueArgs};
use crate::config::Config;
use crate::document::KeyPath;
use crate::error::{AwssmError, Result};
use crate::session::SecretSession;
use crate::store::SecretId;

/// A fully validated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Add { key: KeyPath, value: Value },
    Describe,
    Read { key: KeyPath },
    Remove { key: KeyPath },
    Show,
    Update { key: KeyPath, value: Value },
}

impl Operation {
    /// Check required flags in the order key, then value.
    pub fn from_command(command: Commands) -> Result<Self> {
        Ok(match command {
            Commands::Add(args) => {
                let (key, value) = key_and_value(args)?;
                Operation::Add { key, value }
            }
            Commands::Describe => Operation::Describe,
            Commands::Read { key } => Operation::Read {
                key: required_key(key)?,
            },
            Commands::Remove { key } => Operation::Remove {
                key: required_key(key)?,
            },
            Commands::Show => Operation::Show,
            Commands::Update(args) => {
                let (key, value) = key_and_value(args)?;
                Operation::Update { key, value }
            }
        })
    }
}

/// Pick the secret from the flag, falling back to the configured default.
/// Empty strings count as missing.
pub fn resolve_secret(flag: Option<String>, config: &Config) -> Result<SecretId> {
    flag.filter(|s| !s.is_empty())
        .or_else(|| config.default_secret())
        .ok_or(AwssmError::MissingFlag("--secret"))
        .and_then(SecretId::new)
}

fn required_key(key: Option<String>) -> Result<KeyPath> {
    match key.filter(|k| !k.is_empty()) {
        Some(key) => KeyPath::parse(&key),
        None => Err(AwssmError::MissingFlag("--key")),
    }
}

fn key_and_value(args: ValueArgs) -> Result<(KeyPath, Value)> {
    let key = required_key(args.key)?;
    let raw = args
        .value
        .filter(|v| !v.is_empty())
        .ok_or(AwssmError::MissingFlag("--value"))?;
    Ok((key, parse_value(raw, args.json)?))
}

/// Interpret a command-line value: a JSON string by default, arbitrary JSON
/// with `--json`.
pub fn parse_value(raw: String, json: bool) -> Result<Value> {
    if json {
        serde_json::from_str(&raw).map_err(|e| AwssmError::InvalidValue(e.to_string()))
    } else {
        Ok(Value::String(raw))
    }
}

/// Run a validated operation, printing its output.
pub async fn handle_operation(session: &SecretSession, operation: Operation) -> Result<()> {
    match operation {
        Operation::Add { key, value } => handle_add(session, &key, value).await,
        Operation::Describe => handle_describe(session).await,
        Operation::Read { key } => handle_read(session, &key).await,
        Operation::Remove { key } => handle_remove(session, &key).await,
        Operation::Show => handle_show(session).await,
        Operation::Update { key, value } => handle_update(session, &key, value).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_args(key: Option<&str>, value: Option<&str>, json: bool) -> ValueArgs {
        ValueArgs {
            key: key.map(str::to_string),
            value: value.map(str::to_string),
            json,
        }
    }

    #[test]
    fn test_resolve_secret_prefers_flag() {
        let config = Config::parse("t.kdl", r#"defaults default_secret="from-config""#).unwrap();
        let id = resolve_secret(Some("from-flag".to_string()), &config).unwrap();
        assert_eq!(id.as_str(), "from-flag");

        let id = resolve_secret(None, &config).unwrap();
        assert_eq!(id.as_str(), "from-config");

        let id = resolve_secret(Some(String::new()), &config).unwrap();
        assert_eq!(id.as_str(), "from-config");
    }

    #[test]
    fn test_resolve_secret_missing() {
        let err = resolve_secret(None, &Config::default()).unwrap_err();
        assert!(matches!(err, AwssmError::MissingFlag("--secret")));
    }

    #[test]
    fn test_key_checked_before_value() {
        let err = Operation::from_command(Commands::Add(value_args(None, None, false))).unwrap_err();
        assert!(matches!(err, AwssmError::MissingFlag("--key")));

        let err =
            Operation::from_command(Commands::Update(value_args(Some("a"), Some(""), false)))
                .unwrap_err();
        assert!(matches!(err, AwssmError::MissingFlag("--value")));
    }

    #[test]
    fn test_read_and_remove_need_key() {
        let err = Operation::from_command(Commands::Read { key: None }).unwrap_err();
        assert!(matches!(err, AwssmError::MissingFlag("--key")));

        let err = Operation::from_command(Commands::Remove {
            key: Some(String::new()),
        })
        .unwrap_err();
        assert!(matches!(err, AwssmError::MissingFlag("--key")));
    }

    #[test]
    fn test_show_and_describe_need_nothing() {
        assert_eq!(
            Operation::from_command(Commands::Show).unwrap(),
            Operation::Show
        );
        assert_eq!(
            Operation::from_command(Commands::Describe).unwrap(),
            Operation::Describe
        );
    }

    #[test]
    fn test_value_parsing() {
        let op =
            Operation::from_command(Commands::Add(value_args(Some("port"), Some("5432"), false)))
                .unwrap();
        assert_eq!(
            op,
            Operation::Add {
                key: KeyPath::parse("port").unwrap(),
                value: Value::String("5432".to_string()),
            }
        );

        let op =
            Operation::from_command(Commands::Add(value_args(Some("port"), Some("5432"), true)))
                .unwrap();
        assert_eq!(
            op,
            Operation::Add {
                key: KeyPath::parse("port").unwrap(),
                value: serde_json::json!(5432),
            }
        );

        let err = Operation::from_command(Commands::Add(value_args(Some("x"), Some("{"), true)))
            .unwrap_err();
        assert!(matches!(err, AwssmError::InvalidValue(_)));
        assert!(err.is_configuration());
    }
}
