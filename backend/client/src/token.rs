//! Bearer token resolution.
//!
//! The token lives under `access_token` in one of two stores: a cookie jar
//! (checked first) and a local persistent store (fallback).

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use dragon_core::{KeyValueStore, ACCESS_TOKEN_KEY};
use tracing::{debug, warn};

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding one entry, value kept verbatim.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let entries = HashMap::from([(key.to_string(), value.to_string())]);
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// Cookie jar built from a `Cookie:` request header.
///
/// Entries keep header order; lookups return the first matching name.
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: RwLock<Vec<(String, String)>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=value; other=value` pairs. Segments are trimmed and split
    /// at the first `=`; values are not decoded. Segments without `=` are
    /// skipped.
    pub fn from_header(header: &str) -> Self {
        let entries = header
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| segment.split_once('='))
            .map(|(name, value)| (name.trim().to_string(), value.to_string()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Render the jar back into `Cookie:` header form.
    pub fn to_header(&self) -> String {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default()
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        match entries.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.retain(|(name, _)| name != key);
        Ok(())
    }
}

/// JSON-object file playing the role of browser local storage.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or lazily create) the store at `path`.
    ///
    /// An unreadable or corrupt file is treated as empty and overwritten on
    /// the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt token store");
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read token store");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened token store");
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Open `storage.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(entries).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

fn poisoned() -> io::Error {
    io::Error::other("store lock poisoned")
}

/// Resolves the bearer token: cookie jar first, local store second.
#[derive(Clone)]
pub struct TokenProvider {
    cookies: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
}

impl TokenProvider {
    pub fn new(cookies: Arc<dyn KeyValueStore>, local: Arc<dyn KeyValueStore>) -> Self {
        Self { cookies, local }
    }

    /// Provider with two empty in-memory stores.
    pub fn anonymous() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Provider whose cookie jar comes from a request's `Cookie:` header and
    /// whose local store is empty.
    pub fn from_cookie_header(header: &str) -> Self {
        Self::new(
            Arc::new(CookieJar::from_header(header)),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Provider holding an already-extracted token, e.g. from an
    /// `Authorization` header.
    pub fn from_token(token: &str) -> Self {
        Self::new(
            Arc::new(MemoryStore::with_entry(ACCESS_TOKEN_KEY, token)),
            Arc::new(MemoryStore::new()),
        )
    }

    /// The first non-empty `access_token` value, cookie jar first.
    pub fn resolve(&self) -> Option<String> {
        self.cookies
            .get(ACCESS_TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .or_else(|| self.local.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty()))
    }

    /// `Bearer <token>` when a token resolves.
    pub fn bearer(&self) -> Option<String> {
        self.resolve().map(|token| format!("Bearer {token}"))
    }

    /// Persist a freshly issued token in the local store.
    pub fn store(&self, token: &str) -> io::Result<()> {
        self.local.set(ACCESS_TOKEN_KEY, token)
    }

    /// Forget the token in both stores.
    pub fn clear(&self) -> io::Result<()> {
        self.cookies.delete(ACCESS_TOKEN_KEY)?;
        self.local.delete(ACCESS_TOKEN_KEY)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("has_token", &self.resolve().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(cookie: &str, local: Option<&str>) -> TokenProvider {
        let store = MemoryStore::new();
        if let Some(token) = local {
            store.set(ACCESS_TOKEN_KEY, token).unwrap();
        }
        TokenProvider::new(Arc::new(CookieJar::from_header(cookie)), Arc::new(store))
    }

    #[test]
    fn test_cookie_wins_over_local_store() {
        let tokens = provider("theme=dark; access_token=from-cookie", Some("from-local"));
        assert_eq!(tokens.resolve().as_deref(), Some("from-cookie"));
        assert_eq!(tokens.bearer().as_deref(), Some("Bearer from-cookie"));
    }

    #[test]
    fn test_local_store_fallback() {
        let tokens = provider("theme=dark", Some("from-local"));
        assert_eq!(tokens.resolve().as_deref(), Some("from-local"));
    }

    #[test]
    fn test_absent_everywhere() {
        let tokens = provider("", None);
        assert!(tokens.resolve().is_none());
        assert!(tokens.bearer().is_none());
    }

    #[test]
    fn test_empty_cookie_value_falls_through() {
        let tokens = provider("access_token=", Some("from-local"));
        assert_eq!(tokens.resolve().as_deref(), Some("from-local"));
    }

    #[test]
    fn test_from_token_keeps_separators() {
        let tokens = TokenProvider::from_token("abc;def=ghi");
        assert_eq!(tokens.resolve().as_deref(), Some("abc;def=ghi"));
        assert_eq!(tokens.bearer().as_deref(), Some("Bearer abc;def=ghi"));
    }

    #[test]
    fn test_cookie_value_not_decoded() {
        let jar = CookieJar::from_header("  access_token=a%20b==c ;x=1");
        assert_eq!(jar.get(ACCESS_TOKEN_KEY).as_deref(), Some("a%20b==c"));
        assert_eq!(jar.get("x").as_deref(), Some("1"));
        assert!(jar.get("access").is_none());
    }

    #[test]
    fn test_cookie_jar_set_delete_and_render() {
        let jar = CookieJar::from_header("a=1; b=2");
        jar.set("a", "3").unwrap();
        jar.set("c", "4").unwrap();
        jar.delete("b").unwrap();
        assert_eq!(jar.to_header(), "a=3; c=4");
    }

    #[test]
    fn test_store_and_clear() {
        let tokens = TokenProvider::anonymous();
        tokens.store("fresh").unwrap();
        assert_eq!(tokens.resolve().as_deref(), Some("fresh"));
        tokens.clear().unwrap();
        assert!(tokens.resolve().is_none());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        store.set(ACCESS_TOKEN_KEY, "persisted").unwrap();

        let reopened = FileStore::in_dir(dir.path());
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("persisted"));

        reopened.delete(ACCESS_TOKEN_KEY).unwrap();
        assert!(FileStore::in_dir(dir.path()).get(ACCESS_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FileStore::FILE_NAME), "not json").unwrap();
        let store = FileStore::in_dir(dir.path());
        assert!(store.get(ACCESS_TOKEN_KEY).is_none());
        store.set(ACCESS_TOKEN_KEY, "ok").unwrap();
        assert_eq!(FileStore::in_dir(dir.path()).get(ACCESS_TOKEN_KEY).as_deref(), Some("ok"));
    }
}
