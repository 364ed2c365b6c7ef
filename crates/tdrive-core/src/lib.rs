//! tdrive-core: the file-storage side of the TelDrive MCP adapter.
//!
//! Turns loosely-typed tool arguments into backend queries ([`params`]),
//! backend listings into a stable result shape ([`listing`]), and raw file
//! bodies into text or base64 payloads ([`content`]). [`client`] talks to a
//! real TelDrive instance through the [`backend::FileBackend`] trait.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tdrive_core::{Config, ContentResolver, TeldriveClient};
//!
//! # async fn run() -> tdrive_core::Result<()> {
//! let config = Config::from_env()?;
//! let backend = Arc::new(TeldriveClient::new(&config)?);
//! let resolver = ContentResolver::new(backend, config.max_content_bytes);
//! let file = resolver.resolve("file-id").await?;
//! println!("{} ({:?})", file.mime_type, file.category);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod listing;
pub mod params;
pub mod uri;

pub use backend::FileBackend;
pub use client::TeldriveClient;
pub use config::Config;
pub use content::{ContentCategory, ContentResolver, ContentResult};
pub use error::{BackendError, Error, Result};
pub use listing::{FileEntry, FileList, PageMeta};
pub use params::{Arguments, NewFolder, QueryParams};
