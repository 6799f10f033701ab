//! Content uploader — pushes resumes and profile images to the content store.
//!
//! A single attempt per call. Retry and timeout policy belong to the caller.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::applications::validation::FileUpload;

/// Logical destination inside the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Resumes,
    ProfileImages,
}

impl UploadFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFolder::Resumes => "resumes",
            UploadFolder::ProfileImages => "profile-images",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
}

#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// The provider rejected the upload; carries its diagnostic payload.
    #[error("upload to {folder} failed: {message}")]
    Provider {
        folder: &'static str,
        message: String,
    },

    #[error("upload to {folder} timed out after {secs}s")]
    Timeout { folder: &'static str, secs: u64 },
}

#[async_trait]
pub trait ContentUploader: Send + Sync {
    async fn upload(
        &self,
        file: &FileUpload,
        folder: UploadFolder,
    ) -> Result<UploadResult, UploadError>;
}

/// S3 / MinIO backed content store.
pub struct S3ContentUploader {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ContentUploader {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ContentUploader for S3ContentUploader {
    async fn upload(
        &self,
        file: &FileUpload,
        folder: UploadFolder,
    ) -> Result<UploadResult, UploadError> {
        let key = object_key(folder, &file.file_name);
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| UploadError::Provider {
                folder: folder.as_str(),
                message: format!("{e:?}"),
            })?;

        info!("Uploaded {} bytes to s3://{}/{}", file.bytes.len(), self.bucket, key);

        Ok(UploadResult {
            url: format!("{}/{}", self.public_base_url, key),
        })
    }
}

/// Builds `<folder>/<uuid>-<name>` so uploads with the same file name never collide.
pub fn object_key(folder: UploadFolder, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        folder.as_str(),
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    // Browsers on Windows may send the full client path.
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
