//! CLI 하위 명령 실행.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use assetdrop_carousel::clock::TokioClock;
use assetdrop_carousel::driver::AutoplayDriver;
use assetdrop_carousel::timer::{AutoplayTimer, TimerEvent, TimerSettings};
use assetdrop_catalog::filter::FilterCriteria;
use assetdrop_core::models::item::ItemId;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::views::{CarouselView, HomeGridView, SavedGridView};
use crate::wiring::AppContext;

/// 오늘(또는 지정한 일수)의 추천 항목 출력
pub fn featured(ctx: &AppContext, count: Option<usize>, day: Option<i64>) {
    let count = count.unwrap_or(ctx.config.catalog.featured_count);
    let selection = match day {
        Some(day) => ctx.catalog.featured_for_day(count, day),
        None => ctx.catalog.featured(count),
    };

    let carousel = CarouselView::new(ctx.saved.clone(), selection.items);
    println!("추천 항목 (day {}):", selection.day);
    for card in carousel.cards() {
        println!("  {}", card.line());
    }
    if carousel.slide_count() == 0 {
        println!("  (없음)");
    }
}

/// 필터 적용 후 카탈로그 출력
pub fn list(ctx: &AppContext, category: Option<String>, search: Option<String>) {
    let grid = HomeGridView::new(ctx.catalog.clone(), ctx.saved.clone());
    let count = grid.apply_filter(&criteria(category, search));
    println!("카탈로그 {count}/{}개:", ctx.catalog.len());
    for card in grid.cards() {
        println!("  {}", card.line());
    }
}

/// 저장 (홈 그리드에서 시작한 변경으로 처리)
pub fn save(ctx: &AppContext, id: &str) -> Result<()> {
    let id = ItemId::from(id);
    let Some(item) = ctx.catalog.get(&id) else {
        bail!("카탈로그에 없는 항목: {id}");
    };

    let home = HomeGridView::new(ctx.catalog.clone(), ctx.saved.clone());
    let saved_grid = SavedGridView::new(ctx.saved.clone());
    let origin = home.attach(&ctx.sync);
    saved_grid.attach(&ctx.sync);

    if ctx.sync.save_from(origin, &item) {
        println!("저장됨: {} ({})", item.title, id);
    } else {
        println!("이미 저장된 항목: {} ({})", item.title, id);
    }
    println!("저장 목록 {}개", saved_grid.cards().len());

    home.detach(&ctx.sync);
    saved_grid.detach(&ctx.sync);
    Ok(())
}

/// 저장 해제 (저장 목록 그리드에서 시작한 변경으로 처리)
pub fn remove(ctx: &AppContext, id: &str) {
    let id = ItemId::from(id);
    let saved_grid = SavedGridView::new(ctx.saved.clone());
    saved_grid.attach(&ctx.sync);

    if saved_grid.remove(&ctx.sync, &id) {
        println!("저장 해제됨: {id}");
    } else {
        println!("저장되지 않은 항목: {id}");
    }
    saved_grid.detach(&ctx.sync);
}

/// 저장 상태 반전.
///
/// 오늘의 추천 항목이면 캐러셀 카드에서, 아니면 홈 그리드 카드에서 시작한 변경으로 처리한다.
pub fn toggle(ctx: &AppContext, id: &str) -> Result<()> {
    let id = ItemId::from(id);
    let selection = ctx.catalog.featured(ctx.config.catalog.featured_count);
    let carousel = CarouselView::new(ctx.saved.clone(), selection.items);
    let home = HomeGridView::new(ctx.catalog.clone(), ctx.saved.clone());
    carousel.attach(&ctx.sync);
    home.attach(&ctx.sync);

    let result = match carousel.position(&id) {
        Some(index) => carousel.toggle_save(&ctx.sync, index),
        None => home.toggle_save(&ctx.sync, &id),
    };
    carousel.detach(&ctx.sync);
    home.detach(&ctx.sync);
    match result {
        Some(true) => println!("저장됨: {id}"),
        Some(false) => println!("저장 해제됨: {id}"),
        None => bail!("카탈로그에 없는 항목: {id}"),
    }
    Ok(())
}

/// 저장 목록 출력 (카테고리/검색 필터)
pub fn saved(ctx: &AppContext, category: Option<String>, search: Option<String>) {
    let grid = SavedGridView::new(ctx.saved.clone());
    grid.apply_filter(criteria(category, search));
    if grid.is_empty_state() {
        println!("저장된 항목이 없습니다.");
        return;
    }
    println!("저장 목록 {}개:", grid.cards().len());
    for card in grid.cards() {
        println!("  {}", card.line());
    }
}

fn criteria(category: Option<String>, search: Option<String>) -> FilterCriteria {
    let mut criteria = FilterCriteria::all();
    if let Some(category) = category {
        criteria = criteria.with_category(category);
    }
    if let Some(search) = search {
        criteria = criteria.with_search(search);
    }
    criteria
}

/// 추천 캐러셀 자동 재생 (지정 시간 동안 또는 Ctrl+C까지)
pub async fn carousel(ctx: &AppContext, seconds: u64) -> Result<()> {
    let selection = ctx.catalog.featured(ctx.config.catalog.featured_count);
    if selection.is_empty() {
        warn!("추천 항목이 없어 캐러셀을 실행하지 않음");
        println!("표시할 추천 항목이 없습니다.");
        return Ok(());
    }

    let view = CarouselView::new(ctx.saved.clone(), selection.items);
    view.attach(&ctx.sync);

    let settings = TimerSettings::from(&ctx.config.carousel);
    let timer = AutoplayTimer::new(settings, view.slide_count(), Arc::new(TokioClock::new()));
    let driver = AutoplayDriver::spawn(timer);
    let ticker = driver.progress_ticker(ctx.config.carousel.progress_interval());
    let mut events = driver.subscribe();

    info!("캐러셀 시작: {}개, {}초", view.slide_count(), seconds);
    println!("{}", view.render(driver.current_index(), 0.0));

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ctrl_c);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut ctrl_c => {
                info!("Ctrl+C 수신");
                break;
            }
            event = events.recv() => match event {
                Ok(TimerEvent::SlideChanged { index, .. }) => {
                    println!("{}", view.render(index, ticker.latest()));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("캐러셀 이벤트 {skipped}개 누락");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    driver.destroy();
    view.detach(&ctx.sync);
    info!("캐러셀 종료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdrop_core::config::{AppConfig, StorageBackend};
    use tempfile::TempDir;

    async fn context(dir: &TempDir, featured_count: usize) -> AppContext {
        let catalog_path = dir.path().join("assetData.json");
        std::fs::write(
            &catalog_path,
            r#"[{"id": 1, "title": "Robot"}, {"id": 2, "title": "Chair"}, {"id": 3, "title": "Lamp"}]"#,
        )
        .unwrap();

        let mut config = AppConfig::default_config();
        config.catalog.source_path = catalog_path;
        config.catalog.featured_count = featured_count;
        config.storage.backend = StorageBackend::Memory;
        AppContext::build(config, Some(dir.path())).await.unwrap()
    }

    #[tokio::test]
    async fn toggle_featured_item_flips_saved_state() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, 3).await;

        toggle(&ctx, "2").unwrap();
        assert!(ctx.saved.is_saved(2));
        toggle(&ctx, "2").unwrap();
        assert!(!ctx.saved.is_saved(2));
    }

    #[tokio::test]
    async fn toggle_falls_back_to_home_grid_outside_featured_set() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, 1).await;
        let featured = ctx.catalog.featured(1).items;
        let other = ctx
            .catalog
            .items()
            .into_iter()
            .find(|item| !featured.iter().any(|f| f.id == item.id))
            .unwrap();

        toggle(&ctx, other.id.as_str()).unwrap();
        assert!(ctx.saved.is_saved(&other.id));
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_an_error() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, 3).await;
        assert!(toggle(&ctx, "missing").is_err());
        assert!(ctx.saved.all().is_empty());
    }
}
