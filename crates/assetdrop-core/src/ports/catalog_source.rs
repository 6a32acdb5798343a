//! 카탈로그 소스 포트.
//!
//! 구현: `assetdrop-catalog` crate (`JsonFileCatalogSource`)

use async_trait::async_trait;

use crate::error::CoreError;

/// 시작 시 한 번 카탈로그 원본을 가져오는 인터페이스.
///
/// 결과는 가공되지 않은 JSON 값이다. 배열이 아닌 값의 정규화는
/// `CatalogService`가 담당한다.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// 카탈로그 원본 조회
    async fn fetch(&self) -> Result<serde_json::Value, CoreError>;
}
