//! Unified error type for awssm.
//!
//! All public APIs return `Result<T, AwssmError>`. Variants fall into four
//! groups: configuration problems caught before any remote call, key-state
//! conflicts detected against the fetched document, remote store failures,
//! and document (de)serialization failures.

use std::fmt;

use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// The unified error type for all awssm operations.
#[derive(Debug)]
pub enum AwssmError {
    // ── I/O & filesystem ───────────────────────────────────────────────
    /// Filesystem or I/O operation failed.
    Io(std::io::Error),

    // ── Configuration ──────────────────────────────────────────────────
    /// A required command-line flag was not supplied.
    MissingFlag(&'static str),

    /// The key path could not be parsed.
    InvalidKeyPath { path: String, reason: String },

    /// The value given with `--json` is not valid JSON.
    InvalidValue(String),

    /// KDL config file parsing error.
    Config(String),

    // ── Key state ──────────────────────────────────────────────────────
    /// `add` was asked to insert a key that is already present.
    KeyAlreadyExists { secret: String, key: String },

    /// `read`, `update` or `remove` targeted a key that is not present.
    KeyDoesNotExist { secret: String, key: String },

    // ── Remote store ───────────────────────────────────────────────────
    /// The secret identity does not resolve in the remote store.
    NotFound { secret: String },

    /// The caller is not authorized for the requested call.
    PermissionDenied { secret: String, message: String },

    /// Any other transport or service failure.
    RemoteUnavailable { secret: String, message: String },

    /// The secret changed between fetch and write-back.
    VersionConflict {
        secret: String,
        expected: String,
        found: String,
    },

    /// The store holds something this tool cannot edit (e.g. a binary secret).
    Unsupported(String),

    // ── Serialization ──────────────────────────────────────────────────
    /// The secret body is not a JSON object, or a mutation cannot be applied to it.
    MalformedDocument { secret: String, message: String },

    /// JSON serialization error outside the secret document itself.
    Json(serde_json::Error),
}

// ── Display ────────────────────────────────────────────────────────────

impl fmt::Display for AwssmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwssmError::Io(e) => write!(f, "{}", e),
            AwssmError::MissingFlag(flag) => write!(f, "missing flag '{}'", flag),
            AwssmError::InvalidKeyPath { path, reason } => {
                write!(f, "invalid key path \"{}\": {}", path, reason)
            }
            AwssmError::InvalidValue(msg) => write!(f, "invalid JSON value: {}", msg),
            AwssmError::Config(msg) => write!(f, "config error: {}", msg),
            AwssmError::KeyAlreadyExists { secret, key } => {
                write!(f, "key already exists in secret \"{}\": \"{}\"", secret, key)
            }
            AwssmError::KeyDoesNotExist { secret, key } => {
                write!(f, "key does not exist in secret \"{}\": \"{}\"", secret, key)
            }
            AwssmError::NotFound { secret } => {
                write!(f, "secret \"{}\" not found (may have been deleted)", secret)
            }
            AwssmError::PermissionDenied { secret, message } => {
                write!(f, "permission denied on secret \"{}\": {}", secret, message)
            }
            AwssmError::RemoteUnavailable { secret, message } => {
                write!(f, "remote store error for secret \"{}\": {}", secret, message)
            }
            AwssmError::VersionConflict {
                secret,
                expected,
                found,
            } => write!(
                f,
                "secret \"{}\" was modified concurrently (read version {}, current version {}); re-run the command",
                secret, expected, found
            ),
            AwssmError::Unsupported(msg) => write!(f, "unsupported: {}", msg),
            AwssmError::MalformedDocument { secret, message } => {
                write!(f, "malformed document in secret \"{}\": {}", secret, message)
            }
            AwssmError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for AwssmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AwssmError::Io(e) => Some(e),
            AwssmError::Json(e) => Some(e),
            _ => None,
        }
    }
}

// ── From implementations for common error types ────────────────────────

impl From<std::io::Error> for AwssmError {
    fn from(e: std::io::Error) -> Self {
        AwssmError::Io(e)
    }
}

impl From<serde_json::Error> for AwssmError {
    fn from(e: serde_json::Error) -> Self {
        AwssmError::Json(e)
    }
}

impl From<knuffel::Error> for AwssmError {
    fn from(e: knuffel::Error) -> Self {
        AwssmError::Config(e.to_string())
    }
}

// ── Convenience constructors ───────────────────────────────────────────

impl AwssmError {
    /// Create a malformed-document error for the given secret.
    pub fn malformed(secret: impl Into<String>, message: impl Into<String>) -> Self {
        AwssmError::MalformedDocument {
            secret: secret.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        AwssmError::Config(message.into())
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        AwssmError::Unsupported(message.into())
    }

    /// True for errors raised from the local arguments alone, before any
    /// remote call is made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AwssmError::MissingFlag(_)
                | AwssmError::InvalidKeyPath { .. }
                | AwssmError::InvalidValue(_)
                | AwssmError::Config(_)
        )
    }

    /// Translate an AWS Secrets Manager SDK error into the remote error
    /// taxonomy, keeping a user-friendly message.
    pub fn aws<E, R>(secret: &str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: fmt::Debug,
    {
        let secret = secret.to_string();
        let code = err.code().map(str::to_string);

        match code.as_deref() {
            Some("ResourceNotFoundException") => AwssmError::NotFound { secret },
            Some("AccessDeniedException") => AwssmError::PermissionDenied {
                secret,
                message: err
                    .message()
                    .unwrap_or("access denied (check IAM permissions)")
                    .to_string(),
            },
            Some(code) => {
                let message = match code {
                    "DecryptionFailure" => "decryption failed (KMS key issue)".to_string(),
                    "InvalidParameterException" => "invalid parameter".to_string(),
                    "InvalidRequestException" => "invalid request".to_string(),
                    "InternalServiceError" => "AWS internal error (try again later)".to_string(),
                    other => match err.message() {
                        Some(msg) => format!("{}: {}", other, msg),
                        None => other.to_string(),
                    },
                };
                AwssmError::RemoteUnavailable { secret, message }
            }
            // No service error code: dispatch, timeout or response failure.
            None => AwssmError::RemoteUnavailable {
                secret,
                message: DisplayErrorContext(&err).to_string(),
            },
        }
    }
}

/// Convenience type alias for Results using AwssmError.
pub type Result<T> = std::result::Result<T, AwssmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_errors_name_secret_and_key() {
        let err = AwssmError::KeyAlreadyExists {
            secret: "prod/app".to_string(),
            key: "db.password".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("prod/app"));
        assert!(msg.contains("db.password"));

        let err = AwssmError::KeyDoesNotExist {
            secret: "prod/app".to_string(),
            key: "missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "key does not exist in secret \"prod/app\": \"missing\""
        );
    }

    #[test]
    fn test_missing_flag_is_configuration_error() {
        let err = AwssmError::MissingFlag("--secret");
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "missing flag '--secret'");

        let err = AwssmError::NotFound {
            secret: "x".to_string(),
        };
        assert!(!err.is_configuration());
    }

    mod aws_codes {
        use super::*;
        use aws_sdk_secretsmanager::error::{ConnectorError, ErrorMetadata};
        use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;

        fn service_error(code: &str, message: &str) -> SdkError<GetSecretValueError, ()> {
            let meta = ErrorMetadata::builder().code(code).message(message).build();
            SdkError::service_error(GetSecretValueError::generic(meta), ())
        }

        #[test]
        fn test_resource_not_found_maps_to_not_found() {
            let err = AwssmError::aws(
                "prod/app",
                service_error("ResourceNotFoundException", "can't find it"),
            );
            match err {
                AwssmError::NotFound { secret } => assert_eq!(secret, "prod/app"),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }

        #[test]
        fn test_access_denied_keeps_service_message() {
            let err = AwssmError::aws(
                "prod/app",
                service_error("AccessDeniedException", "not authorized"),
            );
            match err {
                AwssmError::PermissionDenied { secret, message } => {
                    assert_eq!(secret, "prod/app");
                    assert_eq!(message, "not authorized");
                }
                other => panic!("expected PermissionDenied, got {:?}", other),
            }
        }

        #[test]
        fn test_other_codes_are_remote_unavailable() {
            let err = AwssmError::aws(
                "prod/app",
                service_error("DecryptionFailure", "kms says no"),
            );
            match err {
                AwssmError::RemoteUnavailable { message, .. } => {
                    assert_eq!(message, "decryption failed (KMS key issue)")
                }
                other => panic!("expected RemoteUnavailable, got {:?}", other),
            }

            let err = AwssmError::aws(
                "prod/app",
                service_error("LimitExceededException", "slow down"),
            );
            match err {
                AwssmError::RemoteUnavailable { message, .. } => {
                    assert_eq!(message, "LimitExceededException: slow down")
                }
                other => panic!("expected RemoteUnavailable, got {:?}", other),
            }
        }

        #[test]
        fn test_transport_failures_are_remote_unavailable() {
            let dispatch = SdkError::<GetSecretValueError, ()>::dispatch_failure(
                ConnectorError::io("connection refused".into()),
            );
            let err = AwssmError::aws("prod/app", dispatch);
            assert!(matches!(err, AwssmError::RemoteUnavailable { .. }));
            assert!(!err.is_configuration());

            let timeout = SdkError::<GetSecretValueError, ()>::timeout_error("timed out");
            let err = AwssmError::aws("prod/app", timeout);
            match err {
                AwssmError::RemoteUnavailable { secret, .. } => assert_eq!(secret, "prod/app"),
                other => panic!("expected RemoteUnavailable, got {:?}", other),
            }
        }
    }
}
