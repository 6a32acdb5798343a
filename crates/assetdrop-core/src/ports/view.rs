//! 뷰 어댑터 포트.
//!
//! 구현: `assetdrop-app` crate (캐러셀 뷰, 홈 그리드, 저장 목록 그리드)

/// 저장 상태 관찰자.
///
/// `refresh()`는 멱등이어야 한다. 표시 상태는 매번 `SavedStore::is_saved`에서
/// 다시 읽으며, 로컬에 캐시한 bool 값을 쓰지 않는다.
pub trait SaveStateObserver: Send + Sync {
    /// 로그용 뷰 이름
    fn name(&self) -> &str;

    /// 저장 상태 표시를 저장소 기준으로 다시 그린다
    fn refresh(&self);
}
