//! Storage backend trait: the seam between the adapter and the file service.
//!
//! The real implementation is [`crate::client::TeldriveClient`]; tests plug
//! in in-memory doubles. Backends only move data. Argument validation,
//! projection and content classification all happen above this trait.
//!
//! # Dyn-compatibility
//!
//! Methods return boxed `Send` futures instead of `impl Future` so that
//! `Arc<dyn FileBackend>` can be shared across concurrent tool calls.
//! Dropping a returned future cancels the request and releases its
//! connection.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::BackendError;
use crate::params::{NewFolder, QueryParams};

/// Boxed, Send future returned by every backend method.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One record of the backend's native file listing.
///
/// Every field is optional on the wire; [`crate::listing::FileList::project`]
/// decides which ones are mandatory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeta {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// The backend's native listing response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFileList {
    #[serde(default)]
    pub items: Vec<RawFile>,
    #[serde(default)]
    pub meta: RawMeta,
}

/// A fully buffered file body with its declared content type.
#[derive(Debug, Clone)]
pub struct StreamedFile {
    /// `Content-Type` as sent by the backend; empty when absent.
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Outcome of a size-capped stream read.
///
/// Exceeding the cap is an expected outcome, not a transport failure, so it
/// is reported as its own variant rather than folded into [`BackendError`].
#[derive(Debug, Clone)]
pub enum StreamOutcome {
    Complete(StreamedFile),
    TooLarge,
}

/// Remote file storage.
pub trait FileBackend: Send + Sync {
    /// List or search files.
    fn list_files<'a>(
        &'a self,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, Result<RawFileList, BackendError>>;

    /// Create a folder.
    fn create_folder<'a>(
        &'a self,
        folder: &'a NewFolder,
    ) -> BoxFuture<'a, Result<(), BackendError>>;

    /// Read a file's content into memory, giving up once it grows past
    /// `max_bytes`.
    fn stream_file<'a>(
        &'a self,
        file_id: &'a str,
        max_bytes: usize,
    ) -> BoxFuture<'a, Result<StreamOutcome, BackendError>>;
}
