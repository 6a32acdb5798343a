//! 저장 목록 서비스.
//!
//! "이 항목이 저장되었는가"의 단일 진실 공급원이자 영속 저장소의 유일한 쓰기 주체.
//!
//! - 메모리 캐시는 첫 접근 시 저장소에서 한 번만 읽고, 이후에는 변경 연산만 갱신한다.
//! - 변경 → 영속 기록 → 구독자 통지 순서로 한 호출 안에서 동기 실행한다.
//! - 영속 기록 실패는 로그만 남기고 메모리 캐시를 기준으로 통지한다.
//! - 손상된 저장 데이터는 빈 목록으로 간주한다.

use assetdrop_core::models::item::{Item, ItemId};
use assetdrop_core::observer::{Subscribers, SubscriptionId};
use assetdrop_core::ports::storage::KeyValueStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 기본 저장 키
pub const DEFAULT_SAVED_KEY: &str = "assetdrop_saved_assets";

/// 저장 목록 서비스
pub struct SavedStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    /// None이면 아직 저장소에서 읽지 않음
    cache: Mutex<Option<Vec<Item>>>,
    subscribers: Mutex<Subscribers<[Item]>>,
}

impl SavedStore {
    /// 새 저장 목록 서비스 생성 (저장소는 첫 접근 시 읽음)
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            cache: Mutex::new(None),
            subscribers: Mutex::new(Subscribers::new()),
        }
    }

    /// 기본 키로 생성
    pub fn with_default_key(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::new(kv, DEFAULT_SAVED_KEY)
    }

    /// 저장 여부 (식별자는 문자열로 정규화 후 비교)
    pub fn is_saved(&self, id: impl Into<ItemId>) -> bool {
        let id = id.into();
        let mut cache = self.cache.lock();
        self.loaded(&mut cache).iter().any(|item| item.id == id)
    }

    /// 항목 사본 저장.
    ///
    /// 새로 추가되었으면 true. 이미 있거나 식별자가 없으면 false.
    pub fn save(&self, item: &Item) -> bool {
        if !item.has_id() {
            error!("식별자 없는 항목은 저장할 수 없음: title={:?}", item.title);
            return false;
        }

        let snapshot = {
            let mut cache = self.cache.lock();
            let items = self.loaded(&mut cache);
            if items.iter().any(|saved| saved.id == item.id) {
                debug!("이미 저장된 항목: {}", item.id);
                return false;
            }
            items.push(item.clone());
            self.persist(items);
            items.clone()
        };

        info!("항목 저장: {} (총 {}개)", item.id, snapshot.len());
        self.notify(&snapshot);
        true
    }

    /// 저장 해제. 실제로 제거된 경우에만 기록/통지하고 true를 반환한다.
    pub fn remove(&self, id: impl Into<ItemId>) -> bool {
        let id = id.into();
        let snapshot = {
            let mut cache = self.cache.lock();
            let items = self.loaded(&mut cache);
            let before = items.len();
            items.retain(|saved| saved.id != id);
            if items.len() == before {
                debug!("저장되지 않은 항목 해제 요청 무시: {id}");
                return false;
            }
            self.persist(items);
            items.clone()
        };

        info!("항목 저장 해제: {id} (총 {}개)", snapshot.len());
        self.notify(&snapshot);
        true
    }

    /// 저장된 항목 전체 (복제본, 저장 순서)
    pub fn all(&self) -> Vec<Item> {
        let mut cache = self.cache.lock();
        self.loaded(&mut cache).clone()
    }

    /// 저장된 항목 조회
    pub fn get(&self, id: impl Into<ItemId>) -> Option<Item> {
        let id = id.into();
        let mut cache = self.cache.lock();
        self.loaded(&mut cache)
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        let mut cache = self.cache.lock();
        self.loaded(&mut cache).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 저장 목록 변경 구독 (변경 후 전체 목록으로 호출됨)
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Item]) + Send + Sync + 'static,
    {
        self.subscribers.lock().subscribe(Arc::new(callback))
    }

    /// 구독 해지
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().unsubscribe(id)
    }

    /// 캐시가 비어 있으면 저장소에서 읽어 채운다
    fn loaded<'a>(&self, cache: &'a mut Option<Vec<Item>>) -> &'a mut Vec<Item> {
        cache.get_or_insert_with(|| self.read_persisted())
    }

    fn read_persisted(&self) -> Vec<Item> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("저장 목록 읽기 실패, 빈 목록 사용: {e}");
                return Vec::new();
            }
        };

        let records = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                warn!("저장 목록이 배열이 아님, 빈 목록 사용");
                return Vec::new();
            }
            Err(e) => {
                error!("저장 목록 파싱 실패, 빈 목록 사용: {e}");
                return Vec::new();
            }
        };

        // 레코드 단위 정규화 + 식별자 중복 제거
        let mut seen = HashSet::new();
        let items: Vec<Item> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Item>(record) {
                Ok(item) if item.has_id() => Some(item),
                Ok(_) => {
                    warn!("식별자 없는 저장 레코드 무시");
                    None
                }
                Err(e) => {
                    warn!("저장 레코드 해석 실패, 무시: {e}");
                    None
                }
            })
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        debug!("저장 목록 로드: {}개", items.len());
        items
    }

    fn persist(&self, items: &[Item]) {
        let serialized = match serde_json::to_string(items) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("저장 목록 직렬화 실패: {e}");
                return;
            }
        };
        if let Err(e) = self.kv.set(&self.key, &serialized) {
            warn!("저장 목록 기록 실패, 메모리 상태 유지: {e}");
        }
    }

    // 캐시 잠금을 해제한 뒤 호출한다 (콜백이 is_saved를 다시 읽음)
    fn notify(&self, snapshot: &[Item]) {
        let callbacks = self.subscribers.lock().snapshot();
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKeyValueStore;
    use assetdrop_core::error::CoreError;
    use assetdrop_core::models::item::to_id;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 읽기/쓰기 횟수를 세는 저장소
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryKeyValueStore,
        reads: AtomicUsize,
        writes: AtomicUsize,
        fail_writes: bool,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(CoreError::Storage("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn item(id: &str) -> Item {
        Item::new(id, format!("Item {id}")).with_category("Props")
    }

    fn counting_store() -> (Arc<CountingStore>, SavedStore) {
        let kv = Arc::new(CountingStore::default());
        let store = SavedStore::with_default_key(kv.clone());
        (kv, store)
    }

    fn notification_counter(store: &SavedStore) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        store.subscribe(move |_: &[Item]| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn save_is_idempotent() {
        let (_, store) = counting_store();
        assert!(store.save(&item("a")));
        assert!(!store.save(&item("a")));
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn numeric_id_matches_string_lookup() {
        let (_, store) = counting_store();
        assert!(store.save(&Item::new(42, "Answer")));
        assert!(store.is_saved("42"));
        assert!(store.is_saved(42));
        assert!(store.remove("42"));
        assert!(!store.is_saved(42));
    }

    #[test]
    fn save_without_id_is_rejected() {
        let (kv, store) = counting_store();
        let counter = notification_counter(&store);
        assert!(!store.save(&Item::new("", "nameless")));
        assert_eq!(kv.writes.load(Ordering::SeqCst), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn remove_absent_id_writes_and_notifies_nothing() {
        let (kv, store) = counting_store();
        store.save(&item("a"));
        let counter = notification_counter(&store);
        let writes_before = kv.writes.load(Ordering::SeqCst);

        assert!(!store.remove("missing"));
        assert_eq!(kv.writes.load(Ordering::SeqCst), writes_before);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn removing_last_item_persists_empty_list() {
        let (kv, store) = counting_store();
        store.save(&item("a"));
        assert!(store.remove("a"));

        assert_eq!(
            kv.inner.get(DEFAULT_SAVED_KEY).unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(kv.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscribers_get_full_list_after_each_mutation() {
        let (_, store) = counting_store();
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let sink = lengths.clone();
        store.subscribe(move |items: &[Item]| sink.lock().push(items.len()));

        store.save(&item("a"));
        store.save(&item("b"));
        store.save(&item("b"));
        store.remove("a");
        assert_eq!(*lengths.lock(), vec![1, 2, 1]);
    }

    #[test]
    fn all_returns_defensive_copy() {
        let (_, store) = counting_store();
        store.save(&item("a"));

        let mut copy = store.all();
        copy.clear();
        copy.push(item("intruder"));

        assert!(store.is_saved("a"));
        assert!(!store.is_saved("intruder"));
    }

    #[test]
    fn saved_copy_is_not_a_live_reference() {
        let (_, store) = counting_store();
        let mut original = item("a");
        store.save(&original);

        original.title = "edited in catalog".to_string();
        assert_eq!(store.get("a").unwrap().title, "Item a");
    }

    #[test]
    fn cache_populated_once() {
        let (kv, store) = counting_store();
        store.is_saved("x");
        store.is_saved("y");
        store.all();
        store.save(&item("a"));
        assert_eq!(kv.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn persisted_between_instances() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        {
            let store = SavedStore::with_default_key(kv.clone());
            store.save(&item("a"));
            store.save(&item("b"));
        }
        let reopened = SavedStore::with_default_key(kv);
        let ids: Vec<_> = reopened.all().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![to_id("a"), to_id("b")]);
    }

    #[test]
    fn corrupt_data_treated_as_empty() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(DEFAULT_SAVED_KEY, "{oops"));
        let store = SavedStore::with_default_key(kv);
        assert!(store.is_empty());
        assert!(store.save(&item("a")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn legacy_numeric_ids_and_duplicates_normalized_on_load() {
        let raw = r#"[{"id": 7, "title": "seven"}, {"id": "7", "title": "dup"}, {"title": "no id"}]"#;
        let kv = Arc::new(MemoryKeyValueStore::with_entry(DEFAULT_SAVED_KEY, raw));
        let store = SavedStore::with_default_key(kv);

        assert_eq!(store.len(), 1);
        assert!(store.is_saved("7"));
        assert_eq!(store.get(7).unwrap().title, "seven");
    }

    #[test]
    fn write_failure_keeps_memory_and_still_notifies() {
        let kv = Arc::new(CountingStore {
            fail_writes: true,
            ..Default::default()
        });
        let store = SavedStore::with_default_key(kv.clone());
        let counter = notification_counter(&store);

        assert!(store.save(&item("a")));
        assert!(store.is_saved("a"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(kv.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_may_query_store_during_notification() {
        let store = Arc::new(SavedStore::with_default_key(Arc::new(
            MemoryKeyValueStore::new(),
        )));
        let observed = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&store);
        let sink = observed.clone();
        store.subscribe(move |_: &[Item]| {
            if let Some(store) = weak.upgrade() {
                *sink.lock() = Some(store.is_saved("a"));
            }
        });

        store.save(&item("a"));
        assert_eq!(*observed.lock(), Some(true));
    }
}
