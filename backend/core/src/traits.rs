use std::io;
use std::sync::Arc;

/// A string key-value store standing in for browser-held state
/// (cookie jar, local storage).
///
/// Implementations are synchronous; every backing store is either in memory
/// or a small local file.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove `key`. Removing a missing key is a no-op.
    fn delete(&self, key: &str) -> io::Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        (**self).delete(key)
    }
}
