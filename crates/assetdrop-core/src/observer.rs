//! 동기 구독자 목록.
//!
//! 카탈로그/저장 목록/타이머가 공통으로 쓰는 콜백 레지스트리.
//! 호출 순서는 구독 순서를 따른다. 호출자는 [`Subscribers::snapshot`]으로
//! 콜백을 복제한 뒤 자신의 잠금을 해제하고 나서 호출해야 한다.

use std::sync::Arc;

/// 구독 해지용 토큰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// 구독 콜백
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// 구독자 목록 (구독 순서 유지)
pub struct Subscribers<T: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T: ?Sized> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// 콜백 등록
    pub fn subscribe(&mut self, callback: Callback<T>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, callback));
        id
    }

    /// 콜백 해지 (등록되어 있었으면 true)
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        before != self.entries.len()
    }

    /// 호출용 콜백 복제본 (구독 순서)
    pub fn snapshot(&self) -> Vec<Callback<T>> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}
