use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_sdk_secretsmanager::primitives::DateTime as AwsDateTime;
use aws_sdk_secretsmanager::{Client, config::Region};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{SecretId, SecretMetadata, SecretStore, SecretValue};
use crate::error::{AwssmError, Result};

/// Region used when neither flags, config nor the environment name one.
const FALLBACK_REGION: &str = "us-east-1";

/// Connection settings for AWS Secrets Manager.
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

/// Secrets Manager backed store.
pub struct AwsSecretStore {
    client: Client,
}

impl AwsSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the given settings and the standard AWS
    /// environment (credentials file, env vars, instance metadata).
    pub async fn connect(settings: &AwsSettings) -> Self {
        let region_provider = settings
            .region
            .clone()
            .map(Region::new)
            .map(RegionProviderChain::first_try)
            .unwrap_or_else(RegionProviderChain::default_provider)
            .or_else(Region::new(FALLBACK_REGION));

        let mut config_loader = aws_config::from_env().region(region_provider);

        // A named profile wins over credentials in the environment.
        if let Some(profile_name) = &settings.profile {
            let credentials_provider = ProfileFileCredentialsProvider::builder()
                .profile_name(profile_name)
                .build();
            config_loader = config_loader
                .profile_name(profile_name)
                .credentials_provider(credentials_provider);
        }

        if let Some(url) = &settings.endpoint_url {
            config_loader = config_loader.endpoint_url(url);
        }

        let shared_config = config_loader.load().await;
        debug!(
            region = ?shared_config.region(),
            profile = ?settings.profile,
            "initialized secrets manager client"
        );
        Self::new(Client::new(&shared_config))
    }
}

/// Compare the version found by DescribeSecret with the one the caller
/// fetched. A role without `secretsmanager:DescribeSecret` can still write;
/// the check is skipped for it.
fn check_version(
    secret: &SecretId,
    expected: &str,
    described: Result<SecretMetadata>,
) -> Result<()> {
    let metadata = match described {
        Ok(metadata) => metadata,
        Err(AwssmError::PermissionDenied { message, .. }) => {
            warn!(
                secret = %secret,
                reason = %message,
                "cannot describe secret, writing without version check"
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let found = metadata.current_version().unwrap_or("(none)");
    if found != expected {
        return Err(AwssmError::VersionConflict {
            secret: secret.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

fn to_utc(dt: Option<&AwsDateTime>) -> Option<DateTime<Utc>> {
    dt.and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    fn kind(&self) -> &str {
        "aws"
    }

    async fn fetch(&self, secret: &SecretId) -> Result<SecretValue> {
        debug!(secret = %secret, "GetSecretValue");
        let resp = self
            .client
            .get_secret_value()
            .secret_id(secret.as_str())
            .send()
            .await
            .map_err(|e| AwssmError::aws(secret.as_str(), e))?;

        let raw = resp.secret_string().ok_or_else(|| {
            AwssmError::unsupported(format!(
                "secret \"{}\" is stored as binary, not a string",
                secret
            ))
        })?;

        Ok(SecretValue {
            raw: raw.to_string(),
            version_id: resp.version_id().map(str::to_string),
        })
    }

    async fn describe(&self, secret: &SecretId) -> Result<SecretMetadata> {
        debug!(secret = %secret, "DescribeSecret");
        let resp = self
            .client
            .describe_secret()
            .secret_id(secret.as_str())
            .send()
            .await
            .map_err(|e| AwssmError::aws(secret.as_str(), e))?;

        let versions = resp
            .version_ids_to_stages()
            .map(|stages| {
                stages
                    .iter()
                    .map(|(id, labels)| (id.clone(), labels.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let tags = resp
            .tags()
            .iter()
            .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
            .collect();

        Ok(SecretMetadata {
            name: resp.name().map(str::to_string),
            arn: resp.arn().map(str::to_string),
            description: resp.description().map(str::to_string),
            kms_key_id: resp.kms_key_id().map(str::to_string),
            rotation_enabled: resp.rotation_enabled().unwrap_or(false),
            created_date: to_utc(resp.created_date()),
            last_changed_date: to_utc(resp.last_changed_date()),
            last_accessed_date: to_utc(resp.last_accessed_date()),
            versions,
            tags,
        })
    }

    async fn put(
        &self,
        secret: &SecretId,
        raw: &str,
        expected_version: Option<&str>,
    ) -> Result<Option<String>> {
        // Secrets Manager has no conditional write. Re-checking the current
        // version here leaves a small window between this call and the update.
        if let Some(expected) = expected_version {
            check_version(secret, expected, self.describe(secret).await)?;
        }

        debug!(secret = %secret, "UpdateSecret");
        let resp = self
            .client
            .update_secret()
            .secret_id(secret.as_str())
            .secret_string(raw)
            .client_request_token(Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| AwssmError::aws(secret.as_str(), e))?;

        Ok(resp.version_id().map(str::to_string))
    }
}
