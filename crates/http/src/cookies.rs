//! File-backed cookie jar
//!
//! Keeps the refresh cookie issued by login and reissue across processes.
//! Browsers manage cookies themselves, so this is native only.

use crate::client::error::ClientError;
use railo_core::CoreError;
use reqwest::header::HeaderValue;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use url::Url;

/// File name of the jar inside the data directory
pub const COOKIE_FILE_NAME: &str = "cookies.json";

/// Cookie store shared with reqwest through `ClientBuilder::cookie_provider`
#[derive(Debug, Default)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
    path: Option<PathBuf>,
}

impl CookieJar {
    /// Jar that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the jar at `path`; a missing file is an empty jar
    ///
    /// Expired cookies are dropped on load.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file))
                .map_err(|err| CoreError::serialization(format!("{}: {err}", path.display())))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                cookie_store::CookieStore::default()
            }
            Err(err) => return Err(CoreError::from(err).into()),
        };
        debug!(path = %path.display(), "Cookie jar opened");

        Ok(Self {
            store: RwLock::new(store),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the jar back to its file
    ///
    /// Session cookies are kept too: the refresh cookie usually has no
    /// expiry of its own. Does nothing for an in-memory jar.
    pub fn save(&self) -> Result<(), ClientError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(CoreError::from)?;
        }

        let tmp = path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&tmp).map_err(CoreError::from)?);
        {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut writer)
                .map_err(|err| CoreError::serialization(err.to_string()))?;
        }
        writer.flush().map_err(CoreError::from)?;
        drop(writer);
        std::fs::rename(&tmp, path).map_err(CoreError::from)?;

        debug!(path = %path.display(), "Cookie jar saved");
        Ok(())
    }

    /// Forget every cookie
    pub fn clear(&self) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Value of the cookie `name` that would be sent to `url`
    pub fn get(&self, url: &Url, name: &str) -> Option<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .get_request_values(url)
            .find(|(cookie, _)| *cookie == name)
            .map(|(_, value)| value.to_string())
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|value| {
            let raw = value.to_str().ok()?;
            cookie_store::RawCookie::parse(raw)
                .map(cookie_store::RawCookie::into_owned)
                .ok()
        });

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}
