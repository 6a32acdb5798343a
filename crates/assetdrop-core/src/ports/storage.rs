//! 영속 키-값 저장소 포트.
//!
//! 구현: `assetdrop-storage` crate (인메모리, rusqlite)
//!
//! 저장 목록은 키 하나에 JSON 배열 문자열로 기록된다.

use crate::error::CoreError;

/// 단일 키 단위 문자열 저장소
pub trait KeyValueStore: Send + Sync {
    /// 값 조회 (없으면 `None`)
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// 값 기록 (덮어쓰기)
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
}
