//! 타이머용 단조 시계.
//!
//! 자동 재생 타이머는 밀리초 단위 단조 시각만 필요하다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 밀리초 단위 단조 시각 제공자
pub trait TimerClock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// `std::time::Instant` 기반 시계 (생성 시점 = 0)
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: std::time::Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerClock for InstantClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// tokio 시간 기반 시계.
///
/// `tokio::time::pause()` 상태의 가상 시간을 따르므로 드라이버 테스트가 결정적이다.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerClock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// 수동으로 진행시키는 시계 (테스트용)
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 절대 시각 지정
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    /// 시각 진행
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimerClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
