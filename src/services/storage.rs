use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::Settings;

#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    client: Client,
    bucket: String,
    presign_ttl: Duration,
}

/// Result of a direct upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredObject {
    pub(crate) size_bytes: i64,
    pub(crate) checksum: String,
}

impl StorageService {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        if settings.s3().access_key.is_empty() || settings.s3().secret_key.is_empty() {
            return Ok(None);
        }

        let creds = Credentials::new(
            settings.s3().access_key.clone(),
            settings.s3().secret_key.clone(),
            None,
            None,
            "dissertation-hub-static",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(settings.s3().endpoint.clone())
            .region(aws_config::Region::new(settings.s3().region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&config).force_path_style(true).build(),
        );

        Ok(Some(Self {
            client,
            bucket: settings.s3().bucket.clone(),
            presign_ttl: Duration::from_secs(settings.storage().presigned_url_expire_minutes * 60),
        }))
    }

    pub(crate) fn presign_ttl(&self) -> Duration {
        self.presign_ttl
    }

    pub(crate) async fn presign_put(&self, key: &str, content_type: &str) -> anyhow::Result<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(PresigningConfig::expires_in(self.presign_ttl)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    pub(crate) async fn presign_get(&self, key: &str) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(self.presign_ttl)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    pub(crate) async fn upload_bytes(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<StoredObject> {
        let stored = describe(&bytes);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        Ok(stored)
    }

    pub(crate) async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client.delete_object().bucket(&self.bucket).key(key).send().await?;
        Ok(())
    }
}

pub(crate) fn describe(bytes: &[u8]) -> StoredObject {
    StoredObject { size_bytes: bytes.len() as i64, checksum: hex::encode(Sha256::digest(bytes)) }
}

/// `scope` is a slash separated prefix such as `documents/student/12`.
pub(crate) fn object_key(scope: &str, file_name: &str) -> String {
    format!("{}/{}/{}", scope.trim_matches('/'), Uuid::new_v4(), sanitize_file_name(file_name))
}

/// Prefix under which a user's presigned document uploads land.
pub(crate) fn user_document_scope(user_id: i64) -> String {
    format!("documents/user/{user_id}")
}

/// True when `key` sits strictly below `scope` with no empty or relative segments.
pub(crate) fn key_in_scope(key: &str, scope: &str) -> bool {
    let scope = scope.trim_matches('/');
    let Some(rest) = key.strip_prefix(scope).and_then(|rest| rest.strip_prefix('/')) else {
        return false;
    };
    !rest.is_empty() && rest.split('/').all(|segment| !matches!(segment, "" | "." | ".."))
}

pub(crate) fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(|ch| ch == '/' || ch == '\\').next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') { ch } else { '_' })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.chars().take(128).collect()
    }
}
