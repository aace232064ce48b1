//! Turning media references into URLs a server can fetch.
//!
//! Remote locators pass through. Local files are read here, at generation
//! time, and inlined as `data:` URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use tracing::debug;

use crate::backend::BackendError;
use crate::core::message::{MediaKind, MediaReference, MediaSource};

pub async fn media_url(reference: &MediaReference) -> Result<String, BackendError> {
    match reference.source() {
        MediaSource::RemoteUrl(url) => Ok(url.clone()),
        MediaSource::LocalPath(path) => {
            debug!(path = %path, kind = reference.kind().tag(), "inlining local media");
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| BackendError::Media {
                    locator: path.clone(),
                    source,
                })?;
            Ok(data_url(
                mime_type(Path::new(path), reference.kind()),
                &bytes,
            ))
        }
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn mime_type(path: &Path, kind: MediaKind) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match (kind, extension.as_deref()) {
        (MediaKind::Image, Some("jpg" | "jpeg")) => "image/jpeg",
        (MediaKind::Image, Some("png")) => "image/png",
        (MediaKind::Image, Some("gif")) => "image/gif",
        (MediaKind::Image, Some("bmp")) => "image/bmp",
        (MediaKind::Image, Some("webp")) => "image/webp",
        (MediaKind::Video, Some("mp4")) => "video/mp4",
        (MediaKind::Video, Some("avi")) => "video/x-msvideo",
        (MediaKind::Video, Some("mov")) => "video/quicktime",
        (MediaKind::Video, Some("mkv")) => "video/x-matroska",
        (MediaKind::Video, Some("webm")) => "video/webm",
        _ => "application/octet-stream",
    }
}
