//! 오늘의 추천 선택 결과.

use crate::models::item::{Item, ItemId};

/// 특정 날짜에 대해 결정적으로 선택된 추천 항목 (순서 유지, 중복 없음)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeaturedSelection {
    /// 기준 에포크 이후 경과 일수 (셔플 시드)
    pub day: i64,
    /// 선택된 항목 (캐러셀 표시 순서)
    pub items: Vec<Item>,
}

impl FeaturedSelection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 선택된 항목 식별자 (순서 유지)
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// 식별자로 항목 조회
    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }
}
