//! 저장 상태 동기화 코디네이터.
//!
//! 뷰는 생성 시 코디네이터를 전달받아 명시적으로 등록/해제한다.
//! 저장 목록이 실제로 변경되면 변경을 시작한 뷰를 제외한 모든 등록 뷰의
//! `refresh()`를 등록 순서대로 동기 호출한다. 변경을 시작한 뷰는 자기 표시를 직접 갱신한다.
//! 뷰를 거치지 않은 변경(저장소 직접 호출)은 모든 뷰에 전파된다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use assetdrop_core::models::item::{Item, ItemId};
use assetdrop_core::observer::SubscriptionId;
use assetdrop_core::ports::view::SaveStateObserver;
use assetdrop_storage::saved_store::SavedStore;
use parking_lot::Mutex;
use tracing::{debug, info};

/// 등록된 뷰 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

struct Inner {
    store: Arc<SavedStore>,
    next_id: AtomicU64,
    views: Mutex<Vec<(ViewId, Arc<dyn SaveStateObserver>)>>,
    /// 진행 중인 변경을 시작한 뷰
    origin: Mutex<Option<ViewId>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Inner {
    fn fan_out(&self) {
        let origin = *self.origin.lock();
        // 잠금 해제 후 호출 (refresh 안에서 등록/해제 가능)
        let targets: Vec<(ViewId, Arc<dyn SaveStateObserver>)> = self
            .views
            .lock()
            .iter()
            .filter(|(id, _)| Some(*id) != origin)
            .map(|(id, view)| (*id, Arc::clone(view)))
            .collect();

        for (id, view) in targets {
            debug!("저장 상태 갱신: {} ({id})", view.name());
            view.refresh();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.get_mut().take() {
            self.store.unsubscribe(id);
        }
    }
}

/// 변경 시작 뷰 표시를 호출 범위 동안만 유지
struct OriginGuard<'a> {
    slot: &'a Mutex<Option<ViewId>>,
    previous: Option<ViewId>,
}

impl<'a> OriginGuard<'a> {
    fn set(slot: &'a Mutex<Option<ViewId>>, origin: ViewId) -> Self {
        let previous = slot.lock().replace(origin);
        Self { slot, previous }
    }
}

impl Drop for OriginGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = self.previous;
    }
}

/// 저장 상태 동기화 코디네이터
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    /// 저장 목록 변경을 구독하는 코디네이터 생성
    pub fn new(store: Arc<SavedStore>) -> Self {
        let inner = Arc::new(Inner {
            store,
            next_id: AtomicU64::new(0),
            views: Mutex::new(Vec::new()),
            origin: Mutex::new(None),
            subscription: Mutex::new(None),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let id = inner.store.subscribe(move |_saved: &[Item]| {
            if let Some(inner) = weak.upgrade() {
                inner.fan_out();
            }
        });
        *inner.subscription.lock() = Some(id);

        Self { inner }
    }

    /// 저장 목록 서비스
    pub fn store(&self) -> &Arc<SavedStore> {
        &self.inner.store
    }

    /// 뷰 등록
    pub fn register(&self, view: Arc<dyn SaveStateObserver>) -> ViewId {
        let id = ViewId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        info!("뷰 등록: {} ({id})", view.name());
        self.inner.views.lock().push((id, view));
        id
    }

    /// 뷰 해제 (등록되어 있었으면 true)
    pub fn unregister(&self, id: ViewId) -> bool {
        let mut views = self.inner.views.lock();
        let before = views.len();
        views.retain(|(view_id, _)| *view_id != id);
        let removed = before != views.len();
        if removed {
            info!("뷰 해제: {id}");
        }
        removed
    }

    pub fn view_count(&self) -> usize {
        self.inner.views.lock().len()
    }

    pub fn is_saved(&self, id: impl Into<ItemId>) -> bool {
        self.inner.store.is_saved(id)
    }

    /// `origin` 뷰에서 시작한 저장. 다른 뷰에만 전파된다.
    pub fn save_from(&self, origin: ViewId, item: &Item) -> bool {
        let _guard = OriginGuard::set(&self.inner.origin, origin);
        self.inner.store.save(item)
    }

    /// `origin` 뷰에서 시작한 저장 해제. 다른 뷰에만 전파된다.
    pub fn remove_from(&self, origin: ViewId, id: impl Into<ItemId>) -> bool {
        let _guard = OriginGuard::set(&self.inner.origin, origin);
        self.inner.store.remove(id)
    }

    /// 저장 상태 반전. 반전 후 저장 여부를 반환한다.
    pub fn toggle_from(&self, origin: ViewId, item: &Item) -> bool {
        if self.inner.store.is_saved(&item.id) {
            self.remove_from(origin, &item.id);
            false
        } else {
            self.save_from(origin, item)
        }
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("views", &self.view_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdrop_storage::memory::MemoryKeyValueStore;
    use std::sync::atomic::AtomicUsize;

    /// 특정 항목의 저장 표시를 그리는 테스트 뷰
    struct RecordingView {
        name: String,
        store: Arc<SavedStore>,
        watched: ItemId,
        refreshes: AtomicUsize,
        displayed: Mutex<Vec<bool>>,
    }

    impl RecordingView {
        fn new(name: &str, store: &Arc<SavedStore>, watched: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                store: Arc::clone(store),
                watched: ItemId::from(watched),
                refreshes: AtomicUsize::new(0),
                displayed: Mutex::new(Vec::new()),
            })
        }

        fn refreshes(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }
    }

    impl SaveStateObserver for RecordingView {
        fn name(&self) -> &str {
            &self.name
        }

        fn refresh(&self) {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            let saved = self.store.is_saved(&self.watched);
            self.displayed.lock().push(saved);
        }
    }

    fn setup() -> (Arc<SavedStore>, SyncCoordinator) {
        let store = Arc::new(SavedStore::with_default_key(Arc::new(
            MemoryKeyValueStore::new(),
        )));
        let coordinator = SyncCoordinator::new(Arc::clone(&store));
        (store, coordinator)
    }

    #[test]
    fn save_from_one_view_refreshes_the_others_once() {
        let (store, coordinator) = setup();
        let carousel = RecordingView::new("carousel", &store, "42");
        let grid = RecordingView::new("home-grid", &store, "42");
        let saved_grid = RecordingView::new("saved-grid", &store, "42");
        let carousel_id = coordinator.register(carousel.clone());
        coordinator.register(grid.clone());
        coordinator.register(saved_grid.clone());

        assert!(coordinator.save_from(carousel_id, &Item::new(42, "Robot")));

        assert_eq!(carousel.refreshes(), 0);
        assert_eq!(grid.refreshes(), 1);
        assert_eq!(saved_grid.refreshes(), 1);
        assert_eq!(*grid.displayed.lock(), vec![true]);
        assert!(coordinator.is_saved("42"));
        assert!(store.is_saved(42));
    }

    #[test]
    fn no_op_mutations_do_not_fan_out() {
        let (store, coordinator) = setup();
        let a = RecordingView::new("a", &store, "1");
        let b = RecordingView::new("b", &store, "1");
        let a_id = coordinator.register(a.clone());
        coordinator.register(b.clone());

        assert!(!coordinator.remove_from(a_id, "1"));
        assert!(coordinator.save_from(a_id, &Item::new("1", "Lamp")));
        assert!(!coordinator.save_from(a_id, &Item::new("1", "Lamp")));

        assert_eq!(b.refreshes(), 1);
    }

    #[test]
    fn direct_store_mutation_reaches_every_view() {
        let (store, coordinator) = setup();
        let a = RecordingView::new("a", &store, "7");
        let b = RecordingView::new("b", &store, "7");
        coordinator.register(a.clone());
        coordinator.register(b.clone());

        store.save(&Item::new(7, "Chair"));

        assert_eq!(a.refreshes(), 1);
        assert_eq!(b.refreshes(), 1);
    }

    #[test]
    fn origin_is_cleared_after_the_call() {
        let (store, coordinator) = setup();
        let a = RecordingView::new("a", &store, "7");
        let a_id = coordinator.register(a.clone());

        coordinator.save_from(a_id, &Item::new(7, "Chair"));
        assert_eq!(a.refreshes(), 0);

        store.remove(7);
        assert_eq!(a.refreshes(), 1);
        assert_eq!(*a.displayed.lock(), vec![false]);
    }

    #[test]
    fn unregistered_view_is_not_refreshed() {
        let (store, coordinator) = setup();
        let a = RecordingView::new("a", &store, "3");
        let b = RecordingView::new("b", &store, "3");
        let a_id = coordinator.register(a.clone());
        let b_id = coordinator.register(b.clone());

        assert!(coordinator.unregister(b_id));
        assert!(!coordinator.unregister(b_id));
        coordinator.save_from(a_id, &Item::new(3, "Desk"));

        assert_eq!(b.refreshes(), 0);
        assert_eq!(coordinator.view_count(), 1);
    }

    #[test]
    fn toggle_flips_saved_state() {
        let (store, coordinator) = setup();
        let a = RecordingView::new("a", &store, "9");
        let b = RecordingView::new("b", &store, "9");
        let a_id = coordinator.register(a.clone());
        coordinator.register(b.clone());
        let item = Item::new(9, "Mug");

        assert!(coordinator.toggle_from(a_id, &item));
        assert!(!coordinator.toggle_from(a_id, &item));

        assert_eq!(*b.displayed.lock(), vec![true, false]);
        assert!(!store.is_saved(9));
    }

    #[test]
    fn dropping_coordinator_detaches_from_store() {
        let (store, coordinator) = setup();
        let a = RecordingView::new("a", &store, "5");
        coordinator.register(a.clone());

        drop(coordinator);
        store.save(&Item::new(5, "Plant"));

        assert_eq!(a.refreshes(), 0);
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn view_may_unregister_itself_during_refresh() {
        struct OneShot {
            coordinator: Mutex<Option<(SyncCoordinator, ViewId)>>,
            refreshes: AtomicUsize,
        }

        impl SaveStateObserver for OneShot {
            fn name(&self) -> &str {
                "one-shot"
            }

            fn refresh(&self) {
                self.refreshes.fetch_add(1, Ordering::SeqCst);
                if let Some((coordinator, id)) = self.coordinator.lock().take() {
                    coordinator.unregister(id);
                }
            }
        }

        let (store, coordinator) = setup();
        let view = Arc::new(OneShot {
            coordinator: Mutex::new(None),
            refreshes: AtomicUsize::new(0),
        });
        let id = coordinator.register(view.clone());
        *view.coordinator.lock() = Some((coordinator.clone(), id));

        store.save(&Item::new(1, "A"));
        store.save(&Item::new(2, "B"));

        assert_eq!(view.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.view_count(), 0);
    }
}
