//! Image storage collaborator.
//!
//! Problems can carry up to five statement images. They are uploaded to an
//! external CDN before the problem itself is created; the API only persists
//! the resulting descriptors. Uploads for one submission fan out
//! concurrently, and a failed batch cleans up whatever it already stored.

use std::collections::HashMap;

use futures_util::future::join_all;
use reqwest::multipart;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::ImageDescriptor;
use crate::storage::error::ProblemError;

/// Result of a single upload, as reported by the storage collaborator.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub url: String,
    pub storage_key: String,
    pub format: String,
}

/// External image storage. `delete` is best-effort: callers log failures and
/// move on, they never escalate them.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        original_name: &str,
    ) -> Result<StoredImage, ProblemError>;

    async fn delete(&self, storage_key: &str) -> Result<(), ProblemError>;
}

/// One file of a multi-image submission.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub bytes: Vec<u8>,
    pub original_name: String,
}

/// Upload a batch of files concurrently.
///
/// All uploads run at once; if any of them fails the whole batch fails and
/// every image that did get stored is deleted again (best-effort, logged).
/// No partial success is ever reported.
pub async fn upload_all(
    store: &dyn ImageStore,
    files: Vec<UploadFile>,
) -> Result<Vec<ImageDescriptor>, ProblemError> {
    let uploads = files.iter().map(|f| store.upload(f.bytes.clone(), &f.original_name));
    let results = join_all(uploads).await;

    let mut descriptors = Vec::with_capacity(files.len());
    let mut failure: Option<ProblemError> = None;
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(stored) => descriptors.push(ImageDescriptor {
                url: stored.url,
                storage_key: stored.storage_key,
                original_name: file.original_name.clone(),
                size: file.bytes.len() as i64,
                format: stored.format,
            }),
            Err(e) => {
                warn!("image upload failed for {}: {}", file.original_name, e);
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    }

    if let Some(error) = failure {
        cleanup_images(store, &descriptors).await;
        return Err(error);
    }

    info!("uploaded {} image(s)", descriptors.len());
    Ok(descriptors)
}

/// Delete already-stored images after a failed multi-step operation.
/// Failures are logged and not retried.
pub async fn cleanup_images(store: &dyn ImageStore, images: &[ImageDescriptor]) {
    for image in images {
        if let Err(e) = store.delete(&image.storage_key).await {
            warn!(
                "failed to clean up image {} ({}): {}",
                image.storage_key, image.original_name, e
            );
        }
    }
}

/// Cloudinary-backed image store.
///
/// Uploads go through the unsigned upload API (an upload preset must be
/// configured for the cloud); deletes go through the admin API with basic
/// auth, so no request signing is needed.
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
    format: String,
}

impl CloudinaryStore {
    pub fn new(
        cloud_name: String,
        upload_preset: String,
        api_key: String,
        api_secret: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name,
            upload_preset,
            api_key,
            api_secret,
        }
    }

    /// Build from the `CLOUD_NAME` / `CLOUD_UPLOAD_PRESET` / `CLOUD_API_KEY` /
    /// `CLOUD_API_SECRET` environment variables. Returns `None` when the
    /// cloud name is not configured.
    pub fn from_env() -> Option<Self> {
        let cloud_name = std::env::var("CLOUD_NAME").ok()?;
        let upload_preset = std::env::var("CLOUD_UPLOAD_PRESET").unwrap_or_default();
        let api_key = std::env::var("CLOUD_API_KEY").unwrap_or_default();
        let api_secret = std::env::var("CLOUD_API_SECRET").unwrap_or_default();
        Some(Self::new(cloud_name, upload_preset, api_key, api_secret))
    }
}

#[async_trait::async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        original_name: &str,
    ) -> Result<StoredImage, ProblemError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );

        let part = multipart::Part::bytes(bytes).file_name(original_name.to_string());
        let form = multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProblemError::Upstream(format!("image upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ProblemError::Upstream(format!(
                "image upload failed with status {}",
                response.status()
            )));
        }

        let body: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| ProblemError::Upstream(format!("malformed upload response: {e}")))?;

        Ok(StoredImage {
            url: body.secure_url,
            storage_key: body.public_id,
            format: body.format,
        })
    }

    async fn delete(&self, storage_key: &str) -> Result<(), ProblemError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/resources/image/upload",
            self.cloud_name
        );

        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", storage_key)])
            .send()
            .await
            .map_err(|e| ProblemError::Upstream(format!("image delete failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ProblemError::Upstream(format!(
                "image delete failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// In-memory image store used by the test suite and as the fallback when no
/// CDN is configured.
#[derive(Default)]
pub struct MemoryImageStore {
    stored: RwLock<HashMap<String, usize>>,
    fail_on: Option<String>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose uploads fail for file names containing `needle`; lets
    /// tests exercise the batch-cleanup path.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            stored: RwLock::new(HashMap::new()),
            fail_on: Some(needle.into()),
        }
    }

    /// Storage keys currently held, for assertions.
    pub async fn stored_keys(&self) -> Vec<String> {
        self.stored.read().await.keys().cloned().collect()
    }
}

#[async_trait::async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        original_name: &str,
    ) -> Result<StoredImage, ProblemError> {
        if let Some(needle) = &self.fail_on {
            if original_name.contains(needle.as_str()) {
                return Err(ProblemError::Upstream(format!(
                    "simulated upload failure for {original_name}"
                )));
            }
        }

        let storage_key = format!("img_{}", Uuid::new_v4().simple());
        let format = original_name
            .rsplit('.')
            .next()
            .unwrap_or("bin")
            .to_lowercase();
        self.stored
            .write()
            .await
            .insert(storage_key.clone(), bytes.len());

        Ok(StoredImage {
            url: format!("memory://{storage_key}"),
            storage_key,
            format,
        })
    }

    async fn delete(&self, storage_key: &str) -> Result<(), ProblemError> {
        self.stored.write().await.remove(storage_key);
        Ok(())
    }
}
