//! Persistence adapters for the session token
//!
//! A [`TokenStore`] is the single source of truth for the current bearer
//! token. Stores never fail: when the underlying surface is unavailable
//! (unwritable file, poisoned lock) reads yield `None` and writes are
//! dropped after a warning.

use log::{debug, warn};
use reqwest::cookie::{CookieStore, Jar};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use url::Url;

/// Primary storage key for the token
pub const TOKEN_KEY: &str = "token";

/// Second key the dashboard mirrors the token under
pub const LEGACY_TOKEN_KEY: &str = "authToken";

/// Name of the cookie carrying the token
pub const TOKEN_COOKIE: &str = "token";

/// Persistence adapter for the bearer token
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read the current token, if any
    fn get(&self) -> Option<String>;

    /// Replace the current token
    fn set(&self, token: &str);

    /// Forget the current token
    fn remove(&self);
}

/// A string key-value surface, the shape of browser local storage
pub trait KeyValueSurface: Send + Sync + fmt::Debug {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// In-process key-value surface
#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueSurface for MemoryKeyValue {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
    }
}

/// Key-value surface backed by a JSON object on disk
///
/// The whole file is read and rewritten on every operation. A missing or
/// corrupt file reads as empty.
#[derive(Debug)]
pub struct FileKeyValue {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    guard: RwLock<()>,
}

impl FileKeyValue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Token file {} not readable: {}", self.path.display(), e);
                return HashMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring corrupt token file {}: {}", self.path.display(), e);
            HashMap::new()
        })
    }

    fn save(&self, items: &HashMap<String, String>) {
        let json = match serde_json::to_vec_pretty(items) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode token file: {}", e);
                return;
            }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }

        if let Err(e) = fs::write(&self.path, json) {
            warn!("Failed to write token file {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueSurface for FileKeyValue {
    fn get_item(&self, key: &str) -> Option<String> {
        let _read = self.guard.read().unwrap_or_else(PoisonError::into_inner);
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        let _write = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        items.insert(key.to_string(), value.to_string());
        self.save(&items);
    }

    fn remove_item(&self, key: &str) {
        let _write = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        if items.remove(key).is_some() {
            self.save(&items);
        }
    }
}

/// Token store keeping the token under one key of a key-value surface
#[derive(Debug)]
pub struct KeyValueTokenStore<S> {
    surface: S,
    key: String,
}

impl<S: KeyValueSurface> KeyValueTokenStore<S> {
    pub fn new(surface: S) -> Self {
        Self::with_key(surface, TOKEN_KEY)
    }

    pub fn with_key(surface: S, key: &str) -> Self {
        Self {
            surface,
            key: key.to_string(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: KeyValueSurface> TokenStore for KeyValueTokenStore<S> {
    fn get(&self) -> Option<String> {
        self.surface.get_item(&self.key).filter(|t| !t.is_empty())
    }

    fn set(&self, token: &str) {
        self.surface.set_item(&self.key, token);
    }

    fn remove(&self) {
        self.surface.remove_item(&self.key);
    }
}

/// In-memory token store
pub type MemoryTokenStore = KeyValueTokenStore<MemoryKeyValue>;

/// Token store persisted to a JSON file
pub type FileTokenStore = KeyValueTokenStore<FileKeyValue>;

impl KeyValueTokenStore<MemoryKeyValue> {
    pub fn in_memory() -> Self {
        Self::new(MemoryKeyValue::new())
    }
}

impl KeyValueTokenStore<FileKeyValue> {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileKeyValue::new(path))
    }
}

/// The dashboard's storage layout: the token under both [`TOKEN_KEY`] and
/// [`LEGACY_TOKEN_KEY`], plus a [`TOKEN_COOKIE`] cookie with path `/`.
///
/// Reads take the first present key and fall back to the cookie. The cookie
/// jar is normally the one installed in the HTTP client, so the cookie also
/// travels with API requests.
pub struct LegacyTokenStore<S> {
    surface: S,
    cookies: Arc<Jar>,
    cookie_url: Url,
}

impl<S: KeyValueSurface> LegacyTokenStore<S> {
    pub fn new(surface: S, cookies: Arc<Jar>, cookie_url: Url) -> Self {
        Self {
            surface,
            cookies,
            cookie_url,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    /// Value of the token cookie for the configured URL
    pub fn cookie_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.cookie_url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == TOKEN_COOKIE)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }
}

impl<S: KeyValueSurface> TokenStore for LegacyTokenStore<S> {
    fn get(&self) -> Option<String> {
        [TOKEN_KEY, LEGACY_TOKEN_KEY]
            .iter()
            .find_map(|key| self.surface.get_item(key).filter(|t| !t.is_empty()))
            .or_else(|| self.cookie_token())
    }

    fn set(&self, token: &str) {
        self.surface.set_item(TOKEN_KEY, token);
        self.surface.set_item(LEGACY_TOKEN_KEY, token);
        self.cookies.add_cookie_str(
            &format!("{}={}; Path=/; SameSite=Strict", TOKEN_COOKIE, token),
            &self.cookie_url,
        );
    }

    fn remove(&self) {
        self.surface.remove_item(TOKEN_KEY);
        self.surface.remove_item(LEGACY_TOKEN_KEY);
        self.cookies.add_cookie_str(
            &format!(
                "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
                TOKEN_COOKIE
            ),
            &self.cookie_url,
        );
    }
}

impl<S: fmt::Debug> fmt::Debug for LegacyTokenStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyTokenStore")
            .field("surface", &self.surface)
            .field("cookie_url", &self.cookie_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie_url() -> Url {
        Url::parse("http://localhost:5000/").unwrap()
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::in_memory();
        assert_eq!(store.get(), None);

        store.set("abc.def.ghi");
        assert_eq!(store.get(), Some("abc.def.ghi".to_string()));

        store.remove();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("token.json");

        FileTokenStore::at_path(&path).set("persisted");
        let reopened = FileTokenStore::at_path(&path);
        assert_eq!(reopened.get(), Some("persisted".to_string()));

        reopened.remove();
        assert_eq!(FileTokenStore::at_path(&path).get(), None);
    }

    #[test]
    fn test_file_store_degrades_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::at_path(&path);
        assert_eq!(store.get(), None);

        store.set("fresh");
        assert_eq!(store.get(), Some("fresh".to_string()));
    }

    #[test]
    fn test_file_store_unwritable_location_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = FileTokenStore::at_path(blocker.join("token.json"));
        store.set("lost");
        assert_eq!(store.get(), None);
        store.remove();
    }

    #[test]
    fn test_legacy_store_writes_both_keys_and_cookie() {
        let jar = Arc::new(Jar::default());
        let store = LegacyTokenStore::new(MemoryKeyValue::new(), jar, cookie_url());

        store.set("tok");

        assert_eq!(store.surface().get_item(TOKEN_KEY), Some("tok".to_string()));
        assert_eq!(
            store.surface().get_item(LEGACY_TOKEN_KEY),
            Some("tok".to_string())
        );
        assert_eq!(store.cookie_token(), Some("tok".to_string()));
        assert_eq!(store.get(), Some("tok".to_string()));
    }

    #[test]
    fn test_legacy_store_read_precedence() {
        let jar = Arc::new(Jar::default());
        let store = LegacyTokenStore::new(MemoryKeyValue::new(), jar, cookie_url());

        store.surface().set_item(LEGACY_TOKEN_KEY, "second");
        assert_eq!(store.get(), Some("second".to_string()));

        store.surface().set_item(TOKEN_KEY, "first");
        assert_eq!(store.get(), Some("first".to_string()));
    }

    #[test]
    fn test_legacy_store_falls_back_to_cookie() {
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str("token=from-cookie; Path=/", &cookie_url());
        let store = LegacyTokenStore::new(MemoryKeyValue::new(), jar, cookie_url());

        assert_eq!(store.get(), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_legacy_store_remove_clears_everything() {
        let jar = Arc::new(Jar::default());
        let store = LegacyTokenStore::new(MemoryKeyValue::new(), jar, cookie_url());

        store.set("tok");
        store.remove();

        assert_eq!(store.surface().get_item(TOKEN_KEY), None);
        assert_eq!(store.surface().get_item(LEGACY_TOKEN_KEY), None);
        assert_eq!(store.cookie_token(), None);
        assert_eq!(store.get(), None);
    }
}
