use serde::Deserialize;

use crate::config;
use crate::error::ApiError;

/// Metadata returned by the hosted storage provider for a stored file.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredFile {
    pub url: String,
}

/// Client for the hosted object-storage provider. Size and count limits are
/// enforced here, before any bytes leave the process.
pub struct UploadService {
    client: reqwest::Client,
}

impl UploadService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Reject a file the provider would not accept. `file_index` is
    /// zero-based; the configured count limit applies across one request.
    pub fn validate(file_index: usize, size_bytes: usize) -> Result<(), ApiError> {
        let api = &config::config().api;

        if file_index >= api.max_upload_files {
            return Err(ApiError::bad_request(format!(
                "Too many files: at most {} per request",
                api.max_upload_files
            )));
        }
        if size_bytes > api.max_upload_bytes {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds the {} byte upload limit",
                api.max_upload_bytes
            )));
        }
        Ok(())
    }

    pub async fn store(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, ApiError> {
        let storage = &config::config().storage;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|_| ApiError::bad_request(format!("Invalid content type: {}", content_type)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&storage.api_url)
            .bearer_auth(&storage.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!(
                "Storage provider rejected upload of '{}': {}",
                file_name,
                response.status()
            );
            return Err(ApiError::bad_gateway("Storage provider rejected the upload"));
        }

        let stored = response.json::<StoredFile>().await?;
        Ok(stored)
    }
}

impl Default for UploadService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_file_is_rejected_with_413() {
        let max = crate::config::config().api.max_upload_bytes;
        let err = UploadService::validate(0, max + 1).unwrap_err();
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn too_many_files_is_rejected_with_400() {
        let max = crate::config::config().api.max_upload_files;
        let err = UploadService::validate(max, 10).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn small_file_passes() {
        assert!(UploadService::validate(0, 1024).is_ok());
    }
}
