//! 카테고리/검색어 필터.
//!
//! 홈 그리드는 이 결과로 `CatalogService`의 필터 뷰를 교체하고,
//! 저장 목록 그리드는 저장된 항목에 직접 적용한다.

use assetdrop_core::models::item::Item;

/// "전체" 카테고리 값
pub const ALL_CATEGORIES: &str = "all";

/// 필터 조건
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// 카테고리 (None이면 전체)
    pub category: Option<String>,
    /// 검색어 (빈 문자열이면 전체)
    pub search: String,
}

impl FilterCriteria {
    /// 조건 없음
    pub fn all() -> Self {
        Self::default()
    }

    /// 카테고리 지정 (`"all"`은 전체)
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category == ALL_CATEGORIES {
            None
        } else {
            Some(category)
        };
        self
    }

    /// 검색어 지정
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.search.is_empty()
    }

    /// 카테고리 AND 검색어 일치 여부
    pub fn matches(&self, item: &Item) -> bool {
        self.matches_category(item) && self.matches_search(item)
    }

    /// 조건에 맞는 항목만 순서대로
    pub fn apply(&self, items: &[Item]) -> Vec<Item> {
        items
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }

    fn matches_category(&self, item: &Item) -> bool {
        self.category
            .as_deref()
            .map_or(true, |category| item.category == category)
    }

    // 제목, 설명, 카테고리 대소문자 무시 부분 일치
    fn matches_search(&self, item: &Item) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        [&item.title, &item.description, &item.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
