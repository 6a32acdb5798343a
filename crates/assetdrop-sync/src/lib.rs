//! # assetdrop-sync
//!
//! 여러 뷰(캐러셀, 홈 그리드, 저장 목록 그리드)의 저장 상태 표시를
//! [`assetdrop_storage::saved_store::SavedStore`] 기준으로 수렴시키는 코디네이터.

pub mod coordinator;

pub use coordinator::{SyncCoordinator, ViewId};
