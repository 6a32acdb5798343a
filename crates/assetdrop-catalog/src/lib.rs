//! # assetdrop-catalog
//!
//! 카탈로그 서비스.
//! 전체 항목 목록과 필터링된 뷰를 보관하고, 뷰가 바뀌면 구독자에게 동기 통지한다.
//! 에포크 이후 경과 일수를 시드로 한 셔플로 오늘의 추천 항목을 결정적으로 고른다.

pub mod featured;
pub mod filter;
pub mod service;
pub mod source;
