//! 애플리케이션 설정 구조체.
//!
//! 카탈로그 소스, 캐러셀 자동 재생 주기, 저장 목록 저장소 설정을 정의한다.
//! [`crate::config_manager::ConfigManager`]를 통해 JSON 파일에서 로드한다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 카탈로그 설정
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// 캐러셀 자동 재생 설정
    #[serde(default)]
    pub carousel: CarouselConfig,
    /// 저장 목록 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.carousel.cycle_ms == 0 {
            return Err(CoreError::Validation {
                field: "carousel.cycle_ms".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.catalog.featured_count == 0 {
            return Err(CoreError::Validation {
                field: "catalog.featured_count".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.storage.saved_key.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "storage.saved_key".to_string(),
                message: "빈 키는 사용할 수 없습니다".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================
// 카탈로그 설정
// ============================================================

/// 카탈로그 설정: 소스 경로, 추천 개수, 일일 회전 기준일
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 카탈로그 JSON 파일 경로
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,
    /// 캐러셀 추천 항목 수
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
    /// 일일 회전 기준일 (UTC 자정)
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            featured_count: default_featured_count(),
            epoch: default_epoch(),
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from("assetData.json")
}

fn default_featured_count() -> usize {
    6
}

/// 2024-01-01
pub fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

// ============================================================
// 캐러셀 설정
// ============================================================

/// 캐러셀 자동 재생 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// 한 사이클 (자동 전환 간격, 밀리초)
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,
    /// 재개 시 최소 지연 (밀리초)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// 사용자 상호작용 후 자동 재개까지 유예 시간 (밀리초)
    #[serde(default = "default_interaction_grace_ms")]
    pub interaction_grace_ms: u64,
    /// 진행 표시기 갱신 주기 (밀리초, ~60fps)
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

impl CarouselConfig {
    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            cycle_ms: default_cycle_ms(),
            min_delay_ms: default_min_delay_ms(),
            interaction_grace_ms: default_interaction_grace_ms(),
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}

fn default_cycle_ms() -> u64 {
    5_000
}

fn default_min_delay_ms() -> u64 {
    100
}

fn default_interaction_grace_ms() -> u64 {
    10_000
}

fn default_progress_interval_ms() -> u64 {
    16
}

// ============================================================
// 저장소 설정
// ============================================================

/// 저장 목록 저장소 백엔드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite 파일 (기본)
    #[default]
    Sqlite,
    /// 인메모리 (세션 한정)
    Memory,
}

/// 저장 목록 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 데이터 디렉토리 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// 저장 목록 키
    #[serde(default = "default_saved_key")]
    pub saved_key: String,
    /// 백엔드
    #[serde(default)]
    pub backend: StorageBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            saved_key: default_saved_key(),
            backend: StorageBackend::default(),
        }
    }
}

fn default_saved_key() -> String {
    "assetdrop_saved_assets".to_string()
}
