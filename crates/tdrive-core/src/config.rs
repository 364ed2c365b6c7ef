//! Process configuration, read once at startup from the environment.

use std::env;
use std::net::SocketAddr;

use url::Url;

use crate::content::DEFAULT_MAX_CONTENT_BYTES;
use crate::error::{Error, Result};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the TelDrive instance; `/api` is appended per request.
    pub base_url: Url,
    pub auth_token: String,
    pub listen_addr: SocketAddr,
    pub max_content_bytes: usize,
}

impl Config {
    /// Load from the process environment, honouring a `.env` file if present.
    ///
    /// `BASE_URL` and `AUTH_TOKEN` are required; `LISTEN_ADDR` and
    /// `MAX_CONTENT_BYTES` are optional.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("environment variable {key} is not set")))
        };

        let base_url = require("BASE_URL")?;
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| Error::Config(format!("invalid BASE_URL {base_url:?}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "BASE_URL must be an http(s) address, got {base_url}"
            )));
        }

        let auth_token = require("AUTH_TOKEN")?;

        let listen_addr = get("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .map_err(|e| Error::Config(format!("invalid LISTEN_ADDR: {e}")))?;

        let max_content_bytes = match get("MAX_CONTENT_BYTES") {
            None => DEFAULT_MAX_CONTENT_BYTES,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(Error::Config("MAX_CONTENT_BYTES must be positive".into()));
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(Error::Config(format!("invalid MAX_CONTENT_BYTES: {e}")));
                }
            },
        };

        Ok(Self {
            base_url,
            auth_token,
            listen_addr,
            max_content_bytes,
        })
    }
}
