//! File content resolution: read a file from the backend and decide how to
//! represent it.
//!
//! The declared `Content-Type` picks the representation:
//!
//! | declared type                  | category | payload          |
//! |--------------------------------|----------|------------------|
//! | `text/*`, `application/json`   | Text     | UTF-8 text       |
//! | `image/*`                      | Image    | base64 of bytes  |
//! | `audio/*`                      | Audio    | base64 of bytes  |
//! | anything else                  | none     | error            |
//!
//! Text must decode as UTF-8; there is no lossy fallback.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::backend::{FileBackend, StreamOutcome};
use crate::error::{Error, Result};
use crate::uri;

/// Ceiling on buffered file content unless configured otherwise.
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 32 * 1024 * 1024;

/// How a payload is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCategory {
    Image,
    Audio,
    Text,
}

impl ContentCategory {
    /// Classify a declared content type. `None` means unsupported.
    ///
    /// Matching is on the media type only, case-insensitively; parameters
    /// such as `charset` are ignored.
    pub fn classify(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence.starts_with("text/") || essence.starts_with("application/json") {
            Some(ContentCategory::Text)
        } else if essence.starts_with("audio/") {
            Some(ContentCategory::Audio)
        } else if essence.starts_with("image/") {
            Some(ContentCategory::Image)
        } else {
            None
        }
    }
}

/// A resolved file, ready to hand back as a tool result or resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResult {
    pub uri: String,
    pub mime_type: String,
    /// Literal text for [`ContentCategory::Text`], base64 otherwise.
    pub content: String,
    pub category: ContentCategory,
}

/// Encode raw bytes according to their declared type.
pub fn encode(content_type: &str, data: Vec<u8>) -> Result<(ContentCategory, String)> {
    let category = ContentCategory::classify(content_type)
        .ok_or_else(|| Error::UnsupportedContentType(content_type.to_string()))?;

    let content = match category {
        ContentCategory::Text => {
            String::from_utf8(data).map_err(|_| Error::InvalidText(content_type.to_string()))?
        }
        ContentCategory::Image | ContentCategory::Audio => STANDARD.encode(data),
    };
    Ok((category, content))
}

/// Reads file content through a backend, one call per resolution.
#[derive(Clone)]
pub struct ContentResolver {
    backend: Arc<dyn FileBackend>,
    max_bytes: usize,
}

impl ContentResolver {
    pub fn new(backend: Arc<dyn FileBackend>, max_bytes: usize) -> Self {
        Self { backend, max_bytes }
    }

    /// Fetch and classify a file.
    ///
    /// A blank `file_id` fails before the backend is contacted.
    pub async fn resolve(&self, file_id: &str) -> Result<ContentResult> {
        if file_id.trim().is_empty() {
            return Err(Error::MissingArgument("file_id"));
        }

        let file = match self
            .backend
            .stream_file(file_id, self.max_bytes)
            .await
            .map_err(Error::backend("failed to stream file"))?
        {
            StreamOutcome::Complete(file) => file,
            StreamOutcome::TooLarge => {
                return Err(Error::ContentTooLarge {
                    limit: self.max_bytes,
                });
            }
        };

        let (category, content) = encode(&file.content_type, file.data)?;
        log::debug!(
            "resolved {file_id} as {category:?} ({})",
            file.content_type
        );

        Ok(ContentResult {
            uri: uri::file_uri(file_id),
            mime_type: file.content_type,
            content,
            category,
        })
    }
}
