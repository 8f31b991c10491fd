//! Building blocks for layers that load their data by url.

mod file_cache;
mod url_template;

pub use file_cache::FileCacheController;
pub use url_template::UrlTemplate;

use crate::error::WebGisError;

/// Function that builds the url of a data item from its key.
pub trait UrlSource<Key: ?Sized>: (Fn(&Key) -> String) + Send + Sync {}
impl<Key: ?Sized, T: Fn(&Key) -> String> UrlSource<Key> for T where T: Send + Sync {}

/// Persistent storage of loaded data, consulted before a request is sent.
pub trait PersistentCacheController<Key: ?Sized, Data>: Send + Sync {
    /// Returns the stored entry, if any.
    fn get(&self, key: &Key) -> Option<Data>;
    /// Stores the entry.
    fn insert(&self, key: &Key, data: &Data) -> Result<(), WebGisError>;
}
