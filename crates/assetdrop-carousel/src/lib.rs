//! # assetdrop-carousel
//!
//! 캐러셀 자동 재생.
//!
//! - [`timer`]: 렌더링과 무관한 순수 타이밍 상태 머신 (`AutoplayTimer`)
//! - [`clock`]: 타이머용 단조 시계 (시스템, tokio, 수동)
//! - [`driver`]: tokio 런타임에서 예약 작업을 실행하는 드라이버와 진행 표시 루프
//!
//! 슬라이드 전환(사이클 단위)과 진행 표시 갱신(프레임 단위)은 서로 독립된 두 작업이다.
//! 갱신 주기는 렌더링 관심사이며 전환 타이밍 정확도와 무관하다.

pub mod clock;
pub mod driver;
pub mod timer;
