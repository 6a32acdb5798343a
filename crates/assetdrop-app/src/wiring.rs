//! 의존성 와이어링.
//!
//! 설정으로부터 카탈로그 서비스, 저장 목록 저장소, 동기화 코디네이터를 조립한다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use assetdrop_catalog::service::CatalogService;
use assetdrop_catalog::source::JsonFileCatalogSource;
use assetdrop_core::config::{AppConfig, StorageBackend};
use assetdrop_core::config_manager::ConfigManager;
use assetdrop_core::ports::clock::SystemClock;
use assetdrop_core::ports::storage::KeyValueStore;
use assetdrop_storage::memory::MemoryKeyValueStore;
use assetdrop_storage::saved_store::SavedStore;
use assetdrop_storage::sqlite::SqliteKeyValueStore;
use assetdrop_sync::SyncCoordinator;
use tracing::{info, warn};

/// 저장 목록 DB 파일 이름
const DB_FILE_NAME: &str = "assetdrop.db";

/// 조립된 서비스 묶음
pub struct AppContext {
    pub config: AppConfig,
    pub catalog: Arc<CatalogService>,
    pub saved: Arc<SavedStore>,
    pub sync: SyncCoordinator,
}

impl AppContext {
    /// 설정으로 서비스를 조립하고 카탈로그를 로드한다
    pub async fn build(config: AppConfig, data_dir: Option<&Path>) -> Result<Self> {
        let kv = open_kv_store(&config, data_dir)?;
        let saved = Arc::new(SavedStore::new(kv, config.storage.saved_key.clone()));
        let sync = SyncCoordinator::new(saved.clone());

        let catalog = Arc::new(CatalogService::new(
            Arc::new(SystemClock),
            config.catalog.epoch,
        ));
        let source = JsonFileCatalogSource::new(&config.catalog.source_path);
        let count = catalog.load_from(&source).await;
        info!(
            "카탈로그 로드: {}개 ({})",
            count,
            config.catalog.source_path.display()
        );

        Ok(Self {
            config,
            catalog,
            saved,
            sync,
        })
    }
}

/// 설정 로드 (경로 지정 시 해당 파일, 아니면 플랫폼 기본 경로)
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path.to_path_buf()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;

    let config = manager.get();
    config.validate().context("설정 검증 실패")?;
    info!("설정 파일: {}", manager.config_path().display());
    Ok(config)
}

/// 데이터 디렉토리 결정 (CLI 인자 > 설정 > 플랫폼 기본 경로 > 현재 디렉토리)
pub fn resolve_data_dir(cli: Option<&Path>, config: &AppConfig) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| config.storage.data_dir.clone())
        .or_else(|| ConfigManager::data_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 설정된 백엔드로 키-값 저장소 생성
pub fn open_kv_store(config: &AppConfig, data_dir: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("인메모리 저장소 사용: 저장 목록은 종료 시 사라짐");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
        StorageBackend::Sqlite => {
            let db_path = resolve_data_dir(data_dir, config).join(DB_FILE_NAME);
            let store = SqliteKeyValueStore::open(&db_path)
                .with_context(|| format!("저장소 열기 실패: {}", db_path.display()))?;
            info!("SQLite 저장소: {}", db_path.display());
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cli_data_dir_wins_over_config() {
        let mut config = AppConfig::default_config();
        config.storage.data_dir = Some(PathBuf::from("/from/config"));
        let dir = resolve_data_dir(Some(Path::new("/from/cli")), &config);
        assert_eq!(dir, PathBuf::from("/from/cli"));

        let dir = resolve_data_dir(None, &config);
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[tokio::test]
    async fn build_loads_catalog_and_reopens_saved_list() {
        let dir = TempDir::new().unwrap();
        let catalog_path = dir.path().join("assetData.json");
        std::fs::write(
            &catalog_path,
            r#"[{"id": 1, "title": "Robot"}, {"id": "2", "title": "Chair"}]"#,
        )
        .unwrap();

        let mut config = AppConfig::default_config();
        config.catalog.source_path = catalog_path;

        let ctx = AppContext::build(config.clone(), Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(ctx.catalog.len(), 2);
        let robot = ctx.catalog.get(&"1".into()).unwrap();
        assert!(ctx.saved.save(&robot));
        drop(ctx);

        let ctx = AppContext::build(config, Some(dir.path())).await.unwrap();
        assert!(ctx.saved.is_saved(1));
        assert!(dir.path().join(DB_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn missing_catalog_file_yields_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default_config();
        config.catalog.source_path = dir.path().join("missing.json");
        config.storage.backend = StorageBackend::Memory;

        let ctx = AppContext::build(config, None).await.unwrap();
        assert!(ctx.catalog.is_empty());
        assert!(ctx.saved.is_empty());
    }

    #[test]
    fn load_config_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = load_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.carousel.cycle_ms, 5_000);
    }
}
