//! 카탈로그 서비스.
//!
//! 전체 카탈로그와 필터 뷰를 소유한다. 필터 뷰가 바뀔 때마다
//! 구독 순서대로 동기 통지한다 (배치 없음).
//!
//! 잘못된 입력은 빈 카탈로그로 정규화하고 경고만 남긴다.
//! 공개 연산은 에러를 반환하지 않는다.

use assetdrop_core::config::default_epoch;
use assetdrop_core::models::featured::FeaturedSelection;
use assetdrop_core::models::item::{Item, ItemId};
use assetdrop_core::observer::{Subscribers, SubscriptionId};
use assetdrop_core::ports::catalog_source::CatalogSource;
use assetdrop_core::ports::clock::{Clock, SystemClock};
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::featured::{days_since_epoch, seeded_shuffle};
use crate::filter::FilterCriteria;

#[derive(Default)]
struct CatalogState {
    items: Vec<Item>,
    filtered: Vec<Item>,
}

/// 카탈로그 서비스
pub struct CatalogService {
    state: RwLock<CatalogState>,
    subscribers: Mutex<Subscribers<[Item]>>,
    clock: Arc<dyn Clock>,
    epoch: NaiveDate,
}

impl CatalogService {
    /// 새 서비스 생성 (빈 카탈로그)
    pub fn new(clock: Arc<dyn Clock>, epoch: NaiveDate) -> Self {
        Self {
            state: RwLock::new(CatalogState::default()),
            subscribers: Mutex::new(Subscribers::new()),
            clock,
            epoch,
        }
    }

    /// 카탈로그 교체. 필터 뷰를 전체로 되돌리고 구독자에게 통지한다.
    ///
    /// 정규화한 id가 겹치면 처음 항목만 남긴다. 남은 항목 수를 반환한다.
    pub fn load(&self, items: Vec<Item>) -> usize {
        let mut seen = HashSet::with_capacity(items.len());
        let items: Vec<Item> = items
            .into_iter()
            .filter(|item| {
                let first = seen.insert(item.id.clone());
                if !first {
                    warn!("중복 카탈로그 id 무시: {}", item.id);
                }
                first
            })
            .collect();
        let count = items.len();
        {
            let mut state = self.state.write();
            state.filtered = items.clone();
            state.items = items;
        }
        info!("카탈로그 로드 완료: {count}개 항목");
        self.notify();
        count
    }

    /// 가공되지 않은 JSON 값으로 카탈로그 교체.
    ///
    /// 배열이 아니면 빈 카탈로그. 배열 안의 해석 불가 레코드는 건너뛴다.
    /// 로드된 항목 수를 반환한다.
    pub fn load_value(&self, value: Value) -> usize {
        let items = match value {
            Value::Array(records) => records
                .into_iter()
                .enumerate()
                .filter_map(|(index, record)| match serde_json::from_value::<Item>(record) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        warn!("카탈로그 레코드 #{index} 무시: {e}");
                        None
                    }
                })
                .collect(),
            other => {
                warn!("카탈로그 데이터가 배열이 아님 ({}), 빈 카탈로그 사용", value_kind(&other));
                Vec::new()
            }
        };
        self.load(items)
    }

    /// 소스에서 카탈로그를 가져와 로드. 실패하면 빈 카탈로그로 대체한다.
    pub async fn load_from(&self, source: &dyn CatalogSource) -> usize {
        match source.fetch().await {
            Ok(value) => self.load_value(value),
            Err(e) => {
                error!("카탈로그 로드 실패: {e}");
                self.load(Vec::new());
                0
            }
        }
    }

    /// 전체 카탈로그 (복제본)
    pub fn items(&self) -> Vec<Item> {
        self.state.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// 식별자로 카탈로그 항목 조회
    pub fn get(&self, id: &ItemId) -> Option<Item> {
        self.state
            .read()
            .items
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    /// 현재 필터 뷰 (복제본)
    pub fn filtered_view(&self) -> Vec<Item> {
        self.state.read().filtered.clone()
    }

    /// 필터 뷰 교체 후 구독자에게 동기 통지
    pub fn set_filtered_view(&self, items: Vec<Item>) {
        debug!("필터 뷰 교체: {}개 항목", items.len());
        self.state.write().filtered = items;
        self.notify();
    }

    /// 전체 카탈로그에 필터를 적용해 필터 뷰를 다시 계산한다
    pub fn apply_filter(&self, criteria: &FilterCriteria) -> usize {
        let filtered = {
            let state = self.state.read();
            criteria.apply(&state.items)
        };
        let count = filtered.len();
        self.set_filtered_view(filtered);
        count
    }

    /// 필터 뷰 변경 구독
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

    /// 오늘의 추천 선택 (벽시계 기준 일수를 시드로 사용)
    pub fn featured(&self, count: usize) -> FeaturedSelection {
        self.featured_for_day(count, self.current_day())
    }

    /// 지정한 일수를 시드로 추천 선택
    ///
    /// 같은 일수와 같은 카탈로그면 항상 같은 순서를 반환한다.
    pub fn featured_for_day(&self, count: usize, day: i64) -> FeaturedSelection {
        let state = self.state.read();
        if state.items.is_empty() {
            warn!("추천 선택 불가: 카탈로그가 비어 있음");
            return FeaturedSelection {
                day,
                items: Vec::new(),
            };
        }

        let items = seeded_shuffle(&state.items, count, day);
        debug!("추천 선택: day={day}, {}/{}개", items.len(), state.items.len());
        FeaturedSelection { day, items }
    }

    /// 기준일 이후 경과 일수
    pub fn current_day(&self) -> i64 {
        days_since_epoch(self.clock.now(), self.epoch)
    }

    // 잠금을 해제한 상태에서 호출해야 한다 (콜백이 서비스를 다시 읽을 수 있음)
    fn notify(&self) {
        let callbacks = self.subscribers.lock().snapshot();
        if callbacks.is_empty() {
            return;
        }
        let filtered = self.filtered_view();
        for callback in callbacks {
            callback(&filtered);
        }
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), default_epoch())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
