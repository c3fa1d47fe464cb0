//! Upload validation before any provider is called.
//!
//! The declared content type is checked first, then the body is read chunk by
//! chunk and rejected as soon as it grows past the configured maximum, so an
//! oversized upload is never buffered in full.

use futures_util::{pin_mut, Stream, StreamExt};

use crate::config::LimitsConfig;
use crate::error::UploadError;
use crate::types::{ImageFormat, ImageUpload};

/// Validates inbound image uploads.
#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    max_bytes: u64,
}

impl UploadValidator {
    /// Create a new validator with the given limits.
    pub fn new(limits: &LimitsConfig) -> Self {
        Self::with_max_bytes(limits.max_upload_bytes)
    }

    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check that the declared content type is an accepted image type.
    pub fn check_type(&self, content_type: Option<&str>) -> Result<ImageFormat, UploadError> {
        let content_type = content_type.unwrap_or_default();
        ImageFormat::from_mime(content_type).ok_or_else(|| UploadError::InvalidType {
            content_type: content_type.to_string(),
        })
    }

    /// Validate an upload delivered as a stream of byte chunks.
    ///
    /// Stops reading as soon as more than `max_bytes` have been received.
    pub async fn validate_stream<S, B>(
        &self,
        content_type: Option<&str>,
        filename: Option<String>,
        stream: S,
    ) -> Result<ImageUpload, UploadError>
    where
        S: Stream<Item = Result<B, UploadError>>,
        B: AsRef<[u8]>,
    {
        let result = self.read_stream(content_type, filename, stream).await;
        self.log_outcome(content_type, &result);
        result
    }

    /// Validate an upload that is already fully in memory.
    pub fn validate_bytes(
        &self,
        content_type: Option<&str>,
        filename: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<ImageUpload, UploadError> {
        let result = self.check_type(content_type).and_then(|format| {
            self.check_size(bytes.len() as u64)?;
            Ok(ImageUpload {
                bytes,
                format,
                filename,
            })
        });
        self.log_outcome(content_type, &result);
        result
    }

    async fn read_stream<S, B>(
        &self,
        content_type: Option<&str>,
        filename: Option<String>,
        stream: S,
    ) -> Result<ImageUpload, UploadError>
    where
        S: Stream<Item = Result<B, UploadError>>,
        B: AsRef<[u8]>,
    {
        let format = self.check_type(content_type)?;

        pin_mut!(stream);
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let chunk = chunk.as_ref();
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(UploadError::TooLarge {
                    max_bytes: self.max_bytes,
                });
            }
            bytes.extend_from_slice(chunk);
        }

        self.check_size(bytes.len() as u64)?;
        Ok(ImageUpload {
            bytes,
            format,
            filename,
        })
    }

    fn check_size(&self, len: u64) -> Result<(), UploadError> {
        if len == 0 {
            return Err(UploadError::Empty);
        }
        if len > self.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }

    fn log_outcome(&self, content_type: Option<&str>, result: &Result<ImageUpload, UploadError>) {
        match result {
            Ok(upload) => tracing::info!(
                content_type = upload.format.mime_type(),
                size = upload.len(),
                filename = upload.filename.as_deref().unwrap_or(""),
                "Accepted upload"
            ),
            Err(e) => tracing::warn!(
                content_type = content_type.unwrap_or(""),
                max_bytes = self.max_bytes,
                "Rejected upload: {e}"
            ),
        }
    }
}
