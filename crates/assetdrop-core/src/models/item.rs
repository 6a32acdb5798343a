//! 카탈로그 항목 모델.
//!
//! 저장 포맷(JSON 배열)의 레코드 형태를 그대로 따른다.
//! 식별자는 숫자/문자열 어느 쪽으로 들어와도 [`ItemId`] 문자열로 정규화된다.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 임베드 URL 공통 쿼리
const EMBED_QUERY: &str = "autostart=0&ui_theme=dark&ui_controls=1&ui_infos=0&ui_watermark=0";

/// 모델 UID 길이 (16진수 문자 수)
const MODEL_UID_LEN: usize = 32;

/// 정규화된 항목 식별자.
///
/// 비교는 항상 이 타입으로만 한다. 원시 값(숫자/문자열)을 직접 비교하지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// 문자열 식별자 생성
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 식별자 누락 여부 (빈 문자열 또는 공백만)
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// 원시 식별자 → 정규화 식별자.
///
/// 저장소 읽기/쓰기 경계에서 항상 이 함수를 거친다.
pub fn to_id(raw: impl Into<ItemId>) -> ItemId {
    raw.into()
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for ItemId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<&ItemId> for ItemId {
    fn from(value: &ItemId) -> Self {
        value.clone()
    }
}

macro_rules! item_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ItemId {
                fn from(value: $t) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

item_id_from_int!(i32, i64, u32, u64, usize);

impl From<f64> for ItemId {
    fn from(value: f64) -> Self {
        // 정수값 실수는 정수 표기로 (42.0 → "42")
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            Self((value as i64).to_string())
        } else {
            Self(value.to_string())
        }
    }
}

struct ItemIdVisitor;

impl<'de> Visitor<'de> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("문자열 또는 숫자 식별자")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    // null → 식별자 없음 (저장 시 거부됨)
    fn visit_unit<E: de::Error>(self) -> Result<ItemId, E> {
        Ok(ItemId::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<ItemId, E> {
        Ok(ItemId::default())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

/// 카탈로그 항목 (불변 값)
///
/// 저장 목록에는 저장 시점의 사본이 그대로 들어간다.
/// 알 수 없는 필드는 `extra`에 보존되어 사본에 함께 기록된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// 항목 식별자 (정규화됨)
    #[serde(default)]
    pub id: ItemId,
    /// 제목
    #[serde(default)]
    pub title: String,
    /// 설명
    #[serde(default)]
    pub description: String,
    /// 카테고리
    #[serde(default)]
    pub category: String,
    /// 컬렉션 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// 작성자
    #[serde(default)]
    pub author: String,
    /// 작성자 프로필 URL
    #[serde(default)]
    pub author_url: String,
    /// 외부 링크 (모델 페이지)
    #[serde(default, rename = "sketchfabUrl")]
    pub link_url: String,
    /// 임베드 콘텐츠 참조 (모델 UID)
    #[serde(default, rename = "sketchfabId", skip_serializing_if = "Option::is_none")]
    pub embed_id: Option<String>,
    /// 그 외 필드 (원본 그대로 보존)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    /// 식별자와 제목만 가진 항목 생성
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            collection: None,
            author: String::new(),
            author_url: String::new(),
            link_url: String::new(),
            embed_id: None,
            extra: serde_json::Map::new(),
        }
    }

    /// 카테고리 지정
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// 설명 지정
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 외부 링크 지정
    pub fn with_link(mut self, link_url: impl Into<String>) -> Self {
        self.link_url = link_url.into();
        self
    }

    /// 식별자 존재 여부
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// 표시용 카테고리 라벨 ("카테고리 • 컬렉션")
    pub fn category_label(&self) -> String {
        match self.collection.as_deref() {
            Some(collection) if !collection.is_empty() => {
                format!("{} • {}", self.category, collection)
            }
            _ => self.category.clone(),
        }
    }

    /// 외부 링크에서 모델 UID 추출, 없으면 저장된 임베드 참조 사용
    pub fn embed_uid(&self) -> Option<String> {
        find_model_uid(&self.link_url).or_else(|| {
            self.embed_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
    }

    /// 임베드 URL
    pub fn embed_url(&self) -> Option<String> {
        self.embed_uid()
            .map(|uid| format!("https://sketchfab.com/models/{uid}/embed?{EMBED_QUERY}"))
    }
}

/// 처음 등장하는 32자리 16진수 문자열
fn find_model_uid(url: &str) -> Option<String> {
    let bytes = url.as_bytes();
    let mut run = 0usize;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_hexdigit() {
            run += 1;
            if run == MODEL_UID_LEN {
                let start = i + 1 - MODEL_UID_LEN;
                return Some(url[start..=i].to_string());
            }
        } else {
            run = 0;
        }
    }
    None
}
