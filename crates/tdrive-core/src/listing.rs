//! Projection of backend listings into the stable shape returned to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backend::{RawFileList, RawMeta};
use crate::error::{Error, Result};

/// One file or folder as seen at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Pagination counters, passed through from the backend untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub count: u64,
    pub total_pages: u64,
}

impl From<RawMeta> for PageMeta {
    fn from(meta: RawMeta) -> Self {
        Self {
            count: meta.count,
            total_pages: meta.total_pages,
        }
    }
}

/// `{ files, meta }`: the result of `search_files` and `list_files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileList {
    pub files: Vec<FileEntry>,
    pub meta: PageMeta,
}

impl FileList {
    /// Project a raw backend listing, keeping the backend's order.
    ///
    /// Every record must carry an `id` and a `name`; a record without one is
    /// reported rather than dropped so the counts in `meta` stay truthful.
    pub fn project(raw: RawFileList) -> Result<Self> {
        let files = raw
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                Ok(FileEntry {
                    id: item.id.ok_or(Error::MalformedRecord { index, field: "id" })?,
                    name: item.name.ok_or(Error::MalformedRecord {
                        index,
                        field: "name",
                    })?,
                    mime_type: item.mime_type.unwrap_or_default(),
                    size: item.size.unwrap_or(0),
                    updated_at: item.updated_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            files,
            meta: raw.meta.into(),
        })
    }

    /// Serialise for a text tool result.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
