//! AssetDrop 도메인 모델.
//!
//! 카탈로그 항목과 오늘의 추천 선택 결과를 정의한다.
//! 저장 포맷과 호환되도록 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod featured;
pub mod item;
