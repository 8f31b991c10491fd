use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use log::info;

use super::{is_remote, PlatformService};
use crate::error::WebGisError;

/// Platform service loading remote data with `reqwest` and local data from the file system.
#[derive(Debug, Clone)]
pub struct NativePlatformService {
    http_client: reqwest::Client,
    data_dir: PathBuf,
}

impl NativePlatformService {
    /// Creates a new service. Relative urls are resolved against `data_dir`.
    pub fn new(user_agent: &str, data_dir: impl Into<PathBuf>) -> Result<Self, WebGisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http_client,
            data_dir: data_dir.into(),
        })
    }

    async fn load_from_web(&self, url: &str) -> Result<Bytes, WebGisError> {
        info!("Loading {url}");
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            info!("Failed to load {url}: {status}, {:?}", response.text().await);
            return Err(WebGisError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }

    async fn load_from_file(&self, url: &str) -> Result<Bytes, WebGisError> {
        let path = self.data_dir.join(url.trim_start_matches("./"));
        info!("Loading {}", path.display());
        Ok(tokio::fs::read(path).await?.into())
    }
}

#[async_trait]
impl PlatformService for NativePlatformService {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WebGisError> {
        if is_remote(url) {
            self.load_from_web(url).await
        } else {
            self.load_from_file(url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_relative_files_from_data_dir() {
        let dir = std::env::temp_dir().join("webgis-platform-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("provinces.geojson"), b"{}").unwrap();

        let service = NativePlatformService::new("webgis-test", &dir).unwrap();
        let bytes = tokio_test::block_on(service.load_bytes_from_url("provinces.geojson")).unwrap();
        assert_eq!(&bytes[..], b"{}");

        let missing = tokio_test::block_on(service.load_bytes_from_url("missing.geojson"));
        assert!(matches!(missing, Err(WebGisError::FsIo(_))));
    }
}
