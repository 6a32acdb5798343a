//! JSON 파일 카탈로그 소스.
//!
//! `CatalogSource` 포트 구현. 파일 내용을 가공 없이 JSON 값으로 넘긴다.

use assetdrop_core::error::CoreError;
use assetdrop_core::ports::catalog_source::CatalogSource;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 로컬 JSON 파일에서 카탈로그를 읽는 소스
#[derive(Debug, Clone)]
pub struct JsonFileCatalogSource {
    path: PathBuf,
}

impl JsonFileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalogSource {
    async fn fetch(&self) -> Result<serde_json::Value, CoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::Catalog(format!("카탈로그 파일 읽기 실패: {}: {e}", self.path.display()))
        })?;
        debug!("카탈로그 파일 읽음: {} ({} bytes)", self.path.display(), content.len());

        serde_json::from_str(&content).map_err(|e| {
            CoreError::Catalog(format!("카탈로그 파싱 실패: {}: {e}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fetch_reads_json_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assetData.json");
        std::fs::write(&path, r#"[{"id": 1, "title": "Chair"}]"#).unwrap();

        let value = JsonFileCatalogSource::new(&path).fetch().await.unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["title"], "Chair");
    }

    #[tokio::test]
    async fn missing_file_is_catalog_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileCatalogSource::new(dir.path().join("missing.json"));
        assert!(matches!(source.fetch().await, Err(CoreError::Catalog(_))));
    }

    #[tokio::test]
    async fn invalid_json_is_catalog_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(matches!(
            JsonFileCatalogSource::new(path).fetch().await,
            Err(CoreError::Catalog(_))
        ));
    }
}
