//! 캐러셀 자동 재생 타이머.
//!
//! 렌더링과 무관한 순수 상태 머신. 시각은 [`TimerClock`]에서 읽고,
//! 예약된 전환은 호출자가 [`AutoplayTimer::poll`]로 처리한다.
//! tokio 위에서 자동으로 돌리려면 [`crate::driver::AutoplayDriver`]를 쓴다.
//!
//! 상태는 `Running`/`Paused` 두 가지다. 슬라이드가 있으면 새로 만든 타이머는
//! 곧바로 `Running`이며 첫 전환은 생성 시각 + `cycle_ms`에 예약된다.
//! 슬라이드가 없으면 `Paused`로 남는다.
//! 예약 시각 계산은 모두 포화 덧셈이다.
//! 예약 슬롯(자동 전환, 상호작용 후 재개)은 각각 하나뿐이라서
//! 새 예약은 항상 이전 예약을 대체한다.

use std::sync::Arc;

use assetdrop_core::config::CarouselConfig;
use assetdrop_core::observer::{Subscribers, SubscriptionId};
use tracing::debug;

use crate::clock::TimerClock;

/// 타이머 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Running,
    Paused,
}

/// 수동 전환 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// 슬라이드 전환 원인
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCause {
    /// 사이클 만료에 의한 자동 전환
    Autoplay,
    /// 이전/다음 조작
    Manual,
    /// 인덱스 지정 이동
    Jump,
}

/// 타이머 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    SlideChanged { index: usize, cause: AdvanceCause },
    Paused,
    Resumed,
}

/// 타이머 상태 스냅샷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub current_slide_index: usize,
    /// 현재 실행 구간의 시작 시각 (ms)
    pub cycle_start_ms: u64,
    /// 이번 사이클에서 이전 실행 구간들이 소비한 시간 (ms)
    pub accumulated_paused_ms: u64,
    pub is_paused: bool,
}

/// 타이머 시간 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// 슬라이드 하나의 노출 시간
    pub cycle_ms: u64,
    /// 재개 시 남은 시간의 하한
    pub min_delay_ms: u64,
    /// 사용자 조작 후 자동 재개까지의 대기 시간
    pub interaction_grace_ms: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::from(&CarouselConfig::default())
    }
}

impl From<&CarouselConfig> for TimerSettings {
    fn from(config: &CarouselConfig) -> Self {
        Self {
            cycle_ms: config.cycle_ms.max(1),
            min_delay_ms: config.min_delay_ms,
            interaction_grace_ms: config.interaction_grace_ms,
        }
    }
}

/// 캐러셀 자동 재생 타이머
pub struct AutoplayTimer {
    settings: TimerSettings,
    clock: Arc<dyn TimerClock>,
    slide_count: usize,
    state: TimerState,
    /// 자동 전환 예약 시각
    advance_due: Option<u64>,
    /// 상호작용 후 재개 예약 시각
    resume_due: Option<u64>,
    destroyed: bool,
    pending: Vec<TimerEvent>,
    listeners: Subscribers<TimerEvent>,
}

impl AutoplayTimer {
    /// 새 타이머 (인덱스 0)
    ///
    /// 슬라이드가 있으면 Running으로 시작하며 이벤트는 내지 않는다.
    /// `slide_count`가 0이면 Paused로 남고 모든 조작이 무시된다.
    pub fn new(settings: TimerSettings, slide_count: usize, clock: Arc<dyn TimerClock>) -> Self {
        let now = clock.now_ms();
        let settings = TimerSettings {
            cycle_ms: settings.cycle_ms.max(1),
            ..settings
        };
        let running = slide_count > 0;
        Self {
            settings,
            clock,
            slide_count,
            state: TimerState {
                current_slide_index: 0,
                cycle_start_ms: now,
                accumulated_paused_ms: 0,
                is_paused: !running,
            },
            advance_due: running.then(|| now.saturating_add(settings.cycle_ms)),
            resume_due: None,
            destroyed: false,
            pending: Vec::new(),
            listeners: Subscribers::new(),
        }
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    pub fn clock(&self) -> Arc<dyn TimerClock> {
        Arc::clone(&self.clock)
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_slide_index
    }

    pub fn phase(&self) -> TimerPhase {
        if self.state.is_paused {
            TimerPhase::Paused
        } else {
            TimerPhase::Running
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// 가장 가까운 예약 시각 (없으면 None)
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.advance_due, self.resume_due) {
            (Some(a), Some(r)) => Some(a.min(r)),
            (a, r) => a.or(r),
        }
    }

    /// 상호작용 후 재개 예약 시각
    pub fn resume_deadline(&self) -> Option<u64> {
        self.resume_due
    }

    /// 이벤트 구독. 콜백 안에서 타이머를 다시 호출하면 안 된다.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&TimerEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(Arc::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ============================================================
    // 수명 주기
    // ============================================================

    /// 자동 재생 시작/재개.
    ///
    /// 이번 사이클에서 이미 소비한 시간만큼 뺀 나머지 시간 뒤에 다음 전환을 예약한다.
    /// 대기 중인 상호작용 재개 예약은 취소된다.
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        self.start_at(now);
        self.flush();
    }

    /// 자동 재생 정지. 이미 정지 상태면 누적 시간은 변하지 않는다.
    pub fn stop(&mut self) {
        let now = self.clock.now_ms();
        self.stop_at(now);
        self.flush();
    }

    /// Running이면 정지, Paused면 시작
    pub fn toggle(&mut self) {
        if self.state.is_paused {
            self.start();
        } else {
            self.stop();
        }
    }

    /// 이전/다음 슬라이드로 이동하고 카운트다운을 새로 시작한다
    pub fn advance(&mut self, direction: Direction) {
        if !self.is_active() {
            return;
        }
        let n = self.slide_count;
        let current = self.state.current_slide_index;
        let index = match direction {
            Direction::Next => (current + 1) % n,
            Direction::Previous => (current + n - 1) % n,
        };
        let now = self.clock.now_ms();
        self.change_slide(index, AdvanceCause::Manual, now);
        self.flush();
    }

    /// 지정 인덱스로 이동 (슬라이드 수로 나머지 연산)
    pub fn go_to(&mut self, index: usize) {
        if !self.is_active() {
            return;
        }
        let index = index % self.slide_count;
        let now = self.clock.now_ms();
        self.change_slide(index, AdvanceCause::Jump, now);
        self.flush();
    }

    /// 사용자 조작 처리.
    ///
    /// 즉시 정지하고 유예 시간 뒤 재개를 예약한다. 연속 조작 시
    /// 이전 재개 예약은 취소되고 마지막 조작 기준으로 다시 잡힌다.
    pub fn on_user_interaction(&mut self) {
        if !self.is_active() {
            return;
        }
        let now = self.clock.now_ms();
        self.stop_at(now);
        let resume_at = now.saturating_add(self.settings.interaction_grace_ms);
        self.resume_due = Some(resume_at);
        debug!(resume_at, "사용자 조작: 자동 재생 일시 정지");
        self.flush();
    }

    /// 현재 사이클 진행률 [0, 1]
    pub fn progress_fraction(&self) -> f64 {
        if self.slide_count == 0 {
            return 0.0;
        }
        let elapsed = self.elapsed_at(self.clock.now_ms());
        (elapsed as f64 / self.settings.cycle_ms as f64).clamp(0.0, 1.0)
    }

    /// 만료된 예약 처리.
    ///
    /// 늦게 호출되어 여러 예약이 지났으면 예약 시각 순서대로 모두 처리한다.
    /// 발생한 이벤트를 반환하며 구독자에게도 전달한다.
    pub fn poll(&mut self) -> Vec<TimerEvent> {
        if self.destroyed {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        while let Some(deadline) = self.next_deadline() {
            if deadline > now {
                break;
            }
            if self.resume_due == Some(deadline) {
                self.resume_due = None;
                debug!(at = deadline, "유예 시간 만료: 자동 재생 재개");
                self.start_at(deadline);
                continue;
            }
            self.advance_due = None;
            let next = (self.state.current_slide_index + 1) % self.slide_count;
            self.change_slide(next, AdvanceCause::Autoplay, deadline);
        }
        self.flush()
    }

    /// 모든 예약 취소 후 비활성화. 이후 모든 조작은 무시된다.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.advance_due = None;
        self.resume_due = None;
        self.pending.clear();
        self.listeners.clear();
        self.destroyed = true;
        debug!("자동 재생 타이머 해제");
    }

    // ============================================================
    // 내부
    // ============================================================

    fn is_active(&self) -> bool {
        !self.destroyed && self.slide_count > 0
    }

    fn elapsed_at(&self, now: u64) -> u64 {
        if self.state.is_paused {
            self.state.accumulated_paused_ms
        } else {
            now.saturating_sub(self.state.cycle_start_ms)
                .saturating_add(self.state.accumulated_paused_ms)
        }
    }

    fn start_at(&mut self, now: u64) {
        if !self.is_active() {
            return;
        }
        self.resume_due = None;
        let was_paused = self.state.is_paused;
        if !was_paused {
            // 실행 중 재시작: 지금까지의 진행을 누적하고 예약을 다시 잡는다
            self.state.accumulated_paused_ms = self.elapsed_at(now);
        }
        self.advance_due = None;

        let remaining = self
            .settings
            .cycle_ms
            .saturating_sub(self.state.accumulated_paused_ms)
            .max(self.settings.min_delay_ms);
        self.state.cycle_start_ms = now;
        self.state.is_paused = false;
        self.advance_due = Some(now.saturating_add(remaining));

        if was_paused {
            debug!(remaining_ms = remaining, "자동 재생 시작");
            self.pending.push(TimerEvent::Resumed);
        }
    }

    fn stop_at(&mut self, now: u64) {
        if self.destroyed {
            return;
        }
        self.advance_due = None;
        self.resume_due = None;
        if !self.state.is_paused {
            self.state.accumulated_paused_ms = self.elapsed_at(now);
            self.state.is_paused = true;
            debug!(
                accumulated_ms = self.state.accumulated_paused_ms,
                "자동 재생 정지"
            );
            self.pending.push(TimerEvent::Paused);
        }
    }

    fn change_slide(&mut self, index: usize, cause: AdvanceCause, at: u64) {
        self.state.current_slide_index = index;
        self.state.cycle_start_ms = at;
        self.state.accumulated_paused_ms = 0;
        self.advance_due = if self.state.is_paused {
            None
        } else {
            Some(at.saturating_add(self.settings.cycle_ms))
        };
        self.pending.push(TimerEvent::SlideChanged { index, cause });
    }

    fn flush(&mut self) -> Vec<TimerEvent> {
        let events = std::mem::take(&mut self.pending);
        if events.is_empty() {
            return events;
        }
        let callbacks = self.listeners.snapshot();
        for event in &events {
            for callback in &callbacks {
                callback(event);
            }
        }
        events
    }
}

impl std::fmt::Debug for AutoplayTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoplayTimer")
            .field("settings", &self.settings)
            .field("slide_count", &self.slide_count)
            .field("state", &self.state)
            .field("advance_due", &self.advance_due)
            .field("resume_due", &self.resume_due)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
