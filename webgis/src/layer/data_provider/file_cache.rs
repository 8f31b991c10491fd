use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

use crate::error::WebGisError;
use crate::layer::data_provider::PersistentCacheController;

/// Stores the cached data as a set of files in the specified folder. File names are derived from
/// the urls of the entries.
///
/// There is no eviction.
pub struct FileCacheController {
    folder_path: PathBuf,
}

impl PersistentCacheController<str, Bytes> for FileCacheController {
    fn get(&self, key: &str) -> Option<Bytes> {
        let file_path = self.get_file_path(key);
        std::fs::read(file_path).ok().map(Bytes::from)
    }

    fn insert(&self, key: &str, data: &Bytes) -> Result<(), WebGisError> {
        let file_path = self.get_file_path(key);
        let Some(folder) = file_path.parent() else {
            debug!("Cannot cache {key}: {file_path:?} has no parent folder");
            return Err(WebGisError::IO);
        };

        std::fs::create_dir_all(folder)?;
        std::fs::write(&file_path, data)?;
        debug!("Entry {key} saved to cache file {file_path:?}");

        Ok(())
    }
}

impl FileCacheController {
    /// Creates a new instance storing entries in the given folder, creating it if needed.
    ///
    /// Each entry is stored under a nested path built from its url without the scheme and the
    /// query.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, WebGisError> {
        std::fs::create_dir_all(path.as_ref()).map_err(|err| {
            WebGisError::Config(format!(
                "failed to initialize file cache folder {:?}: {err}",
                path.as_ref()
            ))
        })?;

        Ok(Self {
            folder_path: path.as_ref().into(),
        })
    }

    fn get_file_path(&self, url: &str) -> PathBuf {
        let stripped = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .unwrap_or(url);
        let path = stripped.split('?').next().unwrap_or(stripped);

        self.folder_path.join(Path::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path() {
        let folder = std::env::temp_dir().join("webgis-cache-path");
        let cache = FileCacheController::new(&folder).unwrap();
        assert_eq!(
            cache.get_file_path("https://tile.openstreetmap.org/5/20/12.png"),
            folder.join("tile.openstreetmap.org/5/20/12.png")
        );
        assert_eq!(
            cache.get_file_path("https://tile.openstreetmap.org/5/20/12.png?key=abc"),
            folder.join("tile.openstreetmap.org/5/20/12.png")
        );
    }

    #[test]
    fn stores_and_reads_entries() {
        let folder = std::env::temp_dir().join("webgis-cache-entries");
        let _ = std::fs::remove_dir_all(&folder);
        let cache = FileCacheController::new(&folder).unwrap();

        let url = "https://a.basemaps.cartocdn.com/light_all/1/0/0.png";
        assert!(cache.get(url).is_none());
        cache.insert(url, &Bytes::from_static(b"tile")).unwrap();
        assert_eq!(cache.get(url), Some(Bytes::from_static(b"tile")));
    }
}
