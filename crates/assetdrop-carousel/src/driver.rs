//! tokio 기반 자동 재생 드라이버.
//!
//! [`AutoplayTimer`]를 공유 잠금 뒤에 두고 백그라운드 태스크가 다음 예약 시각까지
//! 잠들었다가 `poll()`을 호출한다. 조작 메서드는 태스크를 깨워 새 예약을 반영한다.
//! 이벤트는 broadcast 채널로 전달된다.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::timer::{AutoplayTimer, Direction, TimerEvent, TimerPhase, TimerState};

/// 이벤트 채널 용량
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 자동 재생 드라이버
pub struct AutoplayDriver {
    timer: Arc<Mutex<AutoplayTimer>>,
    wake: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    events_tx: broadcast::Sender<TimerEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AutoplayDriver {
    /// 타이머를 넘겨받아 백그라운드 태스크 시작 (tokio 런타임 안에서 호출)
    pub fn spawn(mut timer: AutoplayTimer) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let forward = events_tx.clone();
        timer.subscribe(move |event: &TimerEvent| {
            // 수신자가 없으면 버린다
            let _ = forward.send(event.clone());
        });

        let timer = Arc::new(Mutex::new(timer));
        let wake = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(timer.clone(), wake.clone(), shutdown_rx));

        info!("자동 재생 드라이버 시작");
        Self {
            timer,
            wake,
            shutdown_tx,
            events_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// 타이머 이벤트 수신기
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    pub fn start(&self) {
        self.with_timer(AutoplayTimer::start);
    }

    pub fn stop(&self) {
        self.with_timer(AutoplayTimer::stop);
    }

    pub fn toggle(&self) {
        self.with_timer(AutoplayTimer::toggle);
    }

    pub fn advance(&self, direction: Direction) {
        self.with_timer(|timer| timer.advance(direction));
    }

    pub fn go_to(&self, index: usize) {
        self.with_timer(|timer| timer.go_to(index));
    }

    pub fn on_user_interaction(&self) {
        self.with_timer(AutoplayTimer::on_user_interaction);
    }

    pub fn progress_fraction(&self) -> f64 {
        self.timer.lock().progress_fraction()
    }

    pub fn phase(&self) -> TimerPhase {
        self.timer.lock().phase()
    }

    pub fn state(&self) -> TimerState {
        self.timer.lock().state()
    }

    pub fn current_index(&self) -> usize {
        self.timer.lock().current_index()
    }

    /// 진행 표시 루프 시작.
    ///
    /// `period`마다 진행률을 watch 채널에 게시한다. 슬라이드 전환과는 독립적이다.
    pub fn progress_ticker(&self, period: Duration) -> ProgressTicker {
        let initial = self.progress_fraction();
        let (tx, rx) = watch::channel(initial);
        let timer = self.timer.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let progress = timer.lock().progress_fraction();
                        if tx.send(progress).is_err() {
                            break;
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            debug!("진행 표시 루프 종료");
        });

        ProgressTicker { rx, handle }
    }

    /// 타이머 해제 및 백그라운드 태스크 종료. 여러 번 호출해도 안전하다.
    pub fn destroy(&self) {
        self.timer.lock().destroy();
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.lock().take() {
            task.abort();
            info!("자동 재생 드라이버 종료");
        }
    }

    fn with_timer(&self, f: impl FnOnce(&mut AutoplayTimer)) {
        {
            let mut timer = self.timer.lock();
            f(&mut timer);
        }
        self.wake.notify_one();
    }
}

impl Drop for AutoplayDriver {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// 진행 표시 루프 핸들
pub struct ProgressTicker {
    rx: watch::Receiver<f64>,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// 진행률 수신기
    pub fn receiver(&self) -> watch::Receiver<f64> {
        self.rx.clone()
    }

    /// 최근 게시된 진행률
    pub fn latest(&self) -> f64 {
        *self.rx.borrow()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_loop(
    timer: Arc<Mutex<AutoplayTimer>>,
    wake: Arc<Notify>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let delay = {
            let timer = timer.lock();
            if timer.is_destroyed() {
                break;
            }
            let now = timer.clock().now_ms();
            timer
                .next_deadline()
                .map(|deadline| Duration::from_millis(deadline.saturating_sub(now)))
        };

        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = wake.notified() => continue,
            _ = sleep_or_wait(delay) => {
                timer.lock().poll();
            }
        }
    }
    debug!("자동 재생 루프 종료");
}

async fn sleep_or_wait(delay: Option<Duration>) {
    match delay {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending::<()>().await,
    }
}
