//! # assetdrop-storage
//!
//! 저장 목록 서비스와 영속 키-값 저장소 어댑터.
//!
//! - [`saved_store`]: 저장 여부의 단일 진실 공급원 (`SavedStore`)
//! - [`memory`]: 인메모리 키-값 저장소 (테스트, 세션 한정 실행)
//! - [`sqlite`]: SQLite 키-값 저장소 (rusqlite)

pub mod memory;
pub mod migration;
pub mod saved_store;
pub mod sqlite;
