//! 헤드리스 뷰 어댑터.
//!
//! 캐러셀, 홈 그리드, 저장 목록 그리드. 각 뷰는 표시 상태를 메모리에 그리고
//! `refresh()`마다 `SavedStore::is_saved`에서 다시 읽는다.
//! 저장 토글은 코디네이터를 통해 실행하며 자기 요소는 직접 갱신한다.

use std::sync::Arc;

use assetdrop_catalog::filter::FilterCriteria;
use assetdrop_catalog::service::CatalogService;
use assetdrop_core::models::item::{Item, ItemId};
use assetdrop_core::ports::view::SaveStateObserver;
use assetdrop_storage::saved_store::SavedStore;
use assetdrop_sync::{SyncCoordinator, ViewId};
use parking_lot::Mutex;
use tracing::debug;

/// 카드 하나의 표시 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: ItemId,
    pub title: String,
    pub label: String,
    pub saved: bool,
}

impl Card {
    fn render(item: &Item, saved: bool) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            label: item.category_label(),
            saved,
        }
    }

    /// 한 줄 표시
    pub fn line(&self) -> String {
        let mark = if self.saved { "★" } else { "☆" };
        if self.label.is_empty() {
            format!("{mark} [{}] {}", self.id, self.title)
        } else {
            format!("{mark} [{}] {} ({})", self.id, self.title, self.label)
        }
    }
}

/// 코디네이터 등록 상태
#[derive(Default)]
struct Registration {
    id: Mutex<Option<ViewId>>,
}

impl Registration {
    fn attach(&self, sync: &SyncCoordinator, view: Arc<dyn SaveStateObserver>) -> ViewId {
        let mut slot = self.id.lock();
        if let Some(id) = *slot {
            return id;
        }
        let id = sync.register(view);
        *slot = Some(id);
        id
    }

    fn detach(&self, sync: &SyncCoordinator) {
        if let Some(id) = self.id.lock().take() {
            sync.unregister(id);
        }
    }

    fn id(&self) -> Option<ViewId> {
        *self.id.lock()
    }
}

/// 카드 목록에서 한 항목의 저장 표시만 갱신
fn mark_card(cards: &Mutex<Vec<Card>>, id: &ItemId, saved: bool) {
    for card in cards.lock().iter_mut().filter(|card| &card.id == id) {
        card.saved = saved;
    }
}

/// 코디네이터를 통한 저장 토글 (미등록 뷰는 모든 뷰에 전파)
fn toggle_through(sync: &SyncCoordinator, origin: Option<ViewId>, item: &Item) -> bool {
    match origin {
        Some(origin) => sync.toggle_from(origin, item),
        None if sync.is_saved(&item.id) => {
            sync.store().remove(&item.id);
            false
        }
        None => sync.store().save(item),
    }
}

// ============================================================
// 캐러셀
// ============================================================

/// 추천 캐러셀 뷰
pub struct CarouselView {
    store: Arc<SavedStore>,
    slides: Vec<Item>,
    cards: Mutex<Vec<Card>>,
    registration: Registration,
}

impl CarouselView {
    /// 마운트 시 한 번 받은 추천 항목으로 생성
    pub fn new(store: Arc<SavedStore>, slides: Vec<Item>) -> Arc<Self> {
        let view = Arc::new(Self {
            store,
            slides,
            cards: Mutex::new(Vec::new()),
            registration: Registration::default(),
        });
        view.refresh();
        view
    }

    pub fn attach(self: &Arc<Self>, sync: &SyncCoordinator) -> ViewId {
        self.registration.attach(sync, self.clone())
    }

    pub fn detach(&self, sync: &SyncCoordinator) {
        self.registration.detach(sync);
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards.lock().clone()
    }

    /// 항목이 놓인 슬라이드 인덱스
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.slides.iter().position(|item| &item.id == id)
    }

    /// 슬라이드 저장 토글. 반전 후 저장 여부를 반환한다.
    pub fn toggle_save(&self, sync: &SyncCoordinator, index: usize) -> Option<bool> {
        let item = self.slides.get(index)?;
        let saved = toggle_through(sync, self.registration.id(), item);
        mark_card(&self.cards, &item.id, saved);
        Some(saved)
    }

    /// 현재 슬라이드와 진행률 한 줄 표시
    pub fn render(&self, index: usize, progress: f64) -> String {
        let cards = self.cards.lock();
        match cards.get(index) {
            Some(card) => format!(
                "{}/{} {} {:>3.0}%",
                index + 1,
                cards.len(),
                card.line(),
                progress.clamp(0.0, 1.0) * 100.0
            ),
            None => "표시할 추천 항목 없음".to_string(),
        }
    }
}

impl SaveStateObserver for CarouselView {
    fn name(&self) -> &str {
        "carousel"
    }

    fn refresh(&self) {
        let cards: Vec<Card> = self
            .slides
            .iter()
            .map(|item| Card::render(item, self.store.is_saved(&item.id)))
            .collect();
        *self.cards.lock() = cards;
    }
}

// ============================================================
// 홈 그리드
// ============================================================

/// 카탈로그 필터 뷰를 그리는 홈 그리드
pub struct HomeGridView {
    catalog: Arc<CatalogService>,
    store: Arc<SavedStore>,
    cards: Mutex<Vec<Card>>,
    registration: Registration,
}

impl HomeGridView {
    pub fn new(catalog: Arc<CatalogService>, store: Arc<SavedStore>) -> Arc<Self> {
        let view = Arc::new(Self {
            catalog,
            store,
            cards: Mutex::new(Vec::new()),
            registration: Registration::default(),
        });
        view.refresh();
        view
    }

    pub fn attach(self: &Arc<Self>, sync: &SyncCoordinator) -> ViewId {
        self.registration.attach(sync, self.clone())
    }

    pub fn detach(&self, sync: &SyncCoordinator) {
        self.registration.detach(sync);
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards.lock().clone()
    }

    /// 필터 적용 후 다시 그린다
    pub fn apply_filter(&self, criteria: &FilterCriteria) -> usize {
        let count = self.catalog.apply_filter(criteria);
        self.refresh();
        count
    }

    /// 카드 저장 토글. 카탈로그에 없는 식별자면 None.
    pub fn toggle_save(&self, sync: &SyncCoordinator, id: &ItemId) -> Option<bool> {
        let item = self.catalog.get(id)?;
        let saved = toggle_through(sync, self.registration.id(), &item);
        mark_card(&self.cards, &item.id, saved);
        Some(saved)
    }
}

impl SaveStateObserver for HomeGridView {
    fn name(&self) -> &str {
        "home-grid"
    }

    fn refresh(&self) {
        let cards: Vec<Card> = self
            .catalog
            .filtered_view()
            .iter()
            .map(|item| Card::render(item, self.store.is_saved(&item.id)))
            .collect();
        *self.cards.lock() = cards;
    }
}

// ============================================================
// 저장 목록 그리드
// ============================================================

/// 저장 목록 그리드 (저장 해제된 항목은 표시에서 빠진다)
pub struct SavedGridView {
    store: Arc<SavedStore>,
    criteria: Mutex<FilterCriteria>,
    cards: Mutex<Vec<Card>>,
    registration: Registration,
}

impl SavedGridView {
    pub fn new(store: Arc<SavedStore>) -> Arc<Self> {
        let view = Arc::new(Self {
            store,
            criteria: Mutex::new(FilterCriteria::all()),
            cards: Mutex::new(Vec::new()),
            registration: Registration::default(),
        });
        view.refresh();
        view
    }

    pub fn attach(self: &Arc<Self>, sync: &SyncCoordinator) -> ViewId {
        self.registration.attach(sync, self.clone())
    }

    pub fn detach(&self, sync: &SyncCoordinator) {
        self.registration.detach(sync);
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards.lock().clone()
    }

    /// 결과 없음 상태
    pub fn is_empty_state(&self) -> bool {
        self.cards.lock().is_empty()
    }

    pub fn apply_filter(&self, criteria: FilterCriteria) -> usize {
        *self.criteria.lock() = criteria;
        self.refresh();
        self.cards.lock().len()
    }

    /// 저장 해제. 자기 표시에서 즉시 제거한다.
    pub fn remove(&self, sync: &SyncCoordinator, id: &ItemId) -> bool {
        let removed = match self.registration.id() {
            Some(origin) => sync.remove_from(origin, id),
            None => sync.store().remove(id),
        };
        if removed {
            self.cards.lock().retain(|card| &card.id != id);
            debug!("저장 목록 그리드에서 제거: {id}");
        }
        removed
    }
}

impl SaveStateObserver for SavedGridView {
    fn name(&self) -> &str {
        "saved-grid"
    }

    fn refresh(&self) {
        let criteria = self.criteria.lock().clone();
        let cards: Vec<Card> = criteria
            .apply(&self.store.all())
            .iter()
            .map(|item| Card::render(item, true))
            .collect();
        *self.cards.lock() = cards;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdrop_storage::memory::MemoryKeyValueStore;

    fn catalog() -> Arc<CatalogService> {
        let catalog = Arc::new(CatalogService::default());
        catalog.load(vec![
            Item::new(1, "Robot").with_category("Characters"),
            Item::new(2, "Chair").with_category("Furniture"),
            Item::new(3, "Lamp").with_category("Furniture"),
        ]);
        catalog
    }

    fn setup() -> (Arc<CatalogService>, Arc<SavedStore>, SyncCoordinator) {
        let store = Arc::new(SavedStore::with_default_key(Arc::new(
            MemoryKeyValueStore::new(),
        )));
        let sync = SyncCoordinator::new(store.clone());
        (catalog(), store, sync)
    }

    #[test]
    fn position_locates_slide_by_normalized_id() {
        let (catalog, store, _) = setup();
        let carousel = CarouselView::new(store, catalog.items());
        assert_eq!(carousel.position(&ItemId::from(3)), Some(2));
        assert_eq!(carousel.position(&ItemId::from("1")), Some(0));
        assert_eq!(carousel.position(&ItemId::from("missing")), None);
    }

    #[test]
    fn saving_from_carousel_updates_every_view() {
        let (catalog, store, sync) = setup();
        let carousel = CarouselView::new(store.clone(), catalog.items());
        let home = HomeGridView::new(catalog.clone(), store.clone());
        let saved = SavedGridView::new(store.clone());
        carousel.attach(&sync);
        home.attach(&sync);
        saved.attach(&sync);

        assert_eq!(carousel.toggle_save(&sync, 1), Some(true));

        assert!(carousel.cards()[1].saved);
        assert!(home.cards().iter().any(|c| c.id == ItemId::from(2) && c.saved));
        assert_eq!(saved.cards().len(), 1);
        assert!(store.is_saved(2));
    }

    #[test]
    fn saved_grid_removal_clears_other_views() {
        let (catalog, store, sync) = setup();
        store.save(&Item::new(3, "Lamp"));
        let home = HomeGridView::new(catalog.clone(), store.clone());
        let saved = SavedGridView::new(store.clone());
        home.attach(&sync);
        saved.attach(&sync);

        assert!(saved.remove(&sync, &ItemId::from(3)));
        assert!(saved.is_empty_state());
        assert!(home.cards().iter().all(|c| !c.saved));
        assert!(!saved.remove(&sync, &ItemId::from(3)));
    }

    #[test]
    fn home_grid_filter_redraws_saved_marks() {
        let (catalog, store, sync) = setup();
        let home = HomeGridView::new(catalog, store.clone());
        home.attach(&sync);
        store.save(&Item::new(2, "Chair"));

        let count = home.apply_filter(&FilterCriteria::all().with_category("Furniture"));
        assert_eq!(count, 2);
        let cards = home.cards();
        assert_eq!(cards.len(), 2);
        assert!(cards[0].saved);
        assert!(!cards[1].saved);
    }

    #[test]
    fn detached_view_stops_refreshing() {
        let (catalog, store, sync) = setup();
        let home = HomeGridView::new(catalog, store.clone());
        home.attach(&sync);
        home.detach(&sync);
        assert_eq!(sync.view_count(), 0);

        store.save(&Item::new(1, "Robot"));
        assert!(home.cards().iter().all(|c| !c.saved));
    }

    #[test]
    fn attach_twice_registers_once() {
        let (_, store, sync) = setup();
        let saved = SavedGridView::new(store);
        let first = saved.attach(&sync);
        let second = saved.attach(&sync);
        assert_eq!(first, second);
        assert_eq!(sync.view_count(), 1);
        saved.detach(&sync);
    }

    #[test]
    fn carousel_render_shows_mark_and_progress() {
        let (catalog, store, _sync) = setup();
        store.save(&Item::new(1, "Robot"));
        let carousel = CarouselView::new(store, catalog.items());
        assert_eq!(
            carousel.render(0, 0.4),
            "1/3 ★ [1] Robot (Characters)  40%"
        );
        assert_eq!(carousel.render(9, 0.0), "표시할 추천 항목 없음");
    }
}
