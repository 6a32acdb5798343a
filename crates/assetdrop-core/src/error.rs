//! AssetDrop 핵심 에러 타입.
//!
//! 어댑터 crate는 외부 라이브러리 에러를 `CoreError`로 매핑해서 반환한다.
//! 공개 서비스 연산(`SavedStore`, `CatalogService`, `AutoplayTimer`)은
//! 이 에러를 호출자에게 전파하지 않고 로그로만 남긴다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Item")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 영속 저장소 읽기/쓰기 실패
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 카탈로그 소스 로드 실패
    #[error("카탈로그 에러: {0}")]
    Catalog(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
