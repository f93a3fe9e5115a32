//! Picture storage.
//!
//! Handlers only see the [`BlobStore`] trait; the shipped implementation
//! keeps files on the local disk.

use std::{future::Future, path::PathBuf};

use async_trait::async_trait;
use axum::{extract::State, http::header, response::IntoResponse};
use engine::EngineError;
use thiserror::Error;
use uuid::Uuid;

use crate::{ServerError, extract::Path, server::ServerState};

pub const ITEM_FOLDER: &str = "items";
pub const PROFILE_FOLDER: &str = "profiles";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob io: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a blob url: {0}")]
    InvalidUrl(String),
    #[error("empty upload")]
    Empty,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `folder` and return the public url.
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<String, BlobError>;

    /// Remove the blob behind `url`. Missing blobs are not an error.
    async fn delete(&self, folder: &str, url: &str) -> Result<(), BlobError>;

    /// Bytes of blob `id` in `folder`, `None` when it does not exist.
    async fn read(&self, folder: &str, id: &str) -> Result<Option<Vec<u8>>, BlobError>;
}

/// Identifier of a blob: the last path segment of its url, without
/// extension.
pub fn public_id(url: &str) -> Option<&str> {
    let last = url.trim_end_matches('/').rsplit('/').next()?;
    let stem = last.split('.').next()?;
    let valid = !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(stem)
}

/// Upload `bytes`, hand the new url to `store` and drop the blob it
/// replaced.
///
/// When `store` fails the fresh upload is removed again.
pub(crate) async fn swap_picture<F, Fut>(
    blobs: &dyn BlobStore,
    folder: &str,
    bytes: Vec<u8>,
    store: F,
) -> Result<String, ServerError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Option<String>, EngineError>>,
{
    let url = blobs.upload(bytes, folder).await?;
    let previous = match store(url.clone()).await {
        Ok(previous) => previous,
        Err(err) => {
            if let Err(cleanup) = blobs.delete(folder, &url).await {
                tracing::warn!("failed to drop orphan blob {url}: {cleanup}");
            }
            return Err(err.into());
        }
    };
    if let Some(previous) = previous {
        if let Err(err) = blobs.delete(folder, &previous).await {
            tracing::warn!("failed to delete replaced blob {previous}: {err}");
        }
    }
    Ok(url)
}

/// Blobs as files under `root/{folder}/{id}`, served from
/// `base_url/{folder}/{id}`.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<String, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        let id = Uuid::new_v4().to_string();
        tokio::fs::write(dir.join(&id), bytes).await?;
        tracing::debug!(folder, id = %id, "blob stored");
        Ok(format!("{}/{folder}/{id}", self.base_url))
    }

    async fn delete(&self, folder: &str, url: &str) -> Result<(), BlobError> {
        let id = public_id(url).ok_or_else(|| BlobError::InvalidUrl(url.to_string()))?;
        match tokio::fs::remove_file(self.root.join(folder).join(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn read(&self, folder: &str, id: &str) -> Result<Option<Vec<u8>>, BlobError> {
        match tokio::fs::read(self.root.join(folder).join(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Serve a stored picture at `/blobs/{folder}/{id}`.
pub(crate) async fn serve(
    State(state): State<ServerState>,
    Path((folder, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServerError> {
    let not_found = || EngineError::KeyNotFound(format!("blob {folder}/{id}"));
    let known_folder = folder == ITEM_FOLDER || folder == PROFILE_FOLDER;
    if !known_folder || public_id(&id) != Some(id.as_str()) {
        return Err(not_found().into());
    }
    let bytes = state
        .blobs
        .read(&folder, &id)
        .await?
        .ok_or_else(not_found)?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}
