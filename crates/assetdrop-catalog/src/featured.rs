//! 일일 추천 선택 알고리즘.
//!
//! 시드 = 기준일(UTC 자정) 이후 경과한 온전한 일수.
//! `sin` 기반 의사난수로 Fisher-Yates 셔플을 돌린다. 위치별 시드는
//! `기본 시드 + 현재 인덱스`이다. 보안용 난수가 아니며 재현성만 보장한다.
//! 기존 배포와 같은 회전 순서를 내기 위해 점화식을 그대로 유지한다.

use chrono::{DateTime, NaiveDate, Utc};

const MS_PER_DAY: i64 = 1_000 * 3_600 * 24;

/// 기준일 이후 경과 일수 (내림, 기준일 이전이면 음수)
pub fn days_since_epoch(now: DateTime<Utc>, epoch: NaiveDate) -> i64 {
    let epoch_ms = epoch
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0);
    (now.timestamp_millis() - epoch_ms).div_euclid(MS_PER_DAY)
}

/// `[0, 1)` 의사난수
pub fn seeded_random(seed: f64) -> f64 {
    let x = seed.sin() * 10_000.0;
    x - x.floor()
}

/// 원본의 복사본을 셔플해서 앞에서 `min(count, len)`개를 반환
pub fn seeded_shuffle<T: Clone>(items: &[T], count: usize, seed: i64) -> Vec<T> {
    if items.is_empty() || count == 0 {
        return Vec::new();
    }

    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let r = seeded_random(seed.wrapping_add(i as i64) as f64);
        // r < 1 이므로 j <= i, 부동소수 오차 대비로만 clamp
        let j = ((r * (i + 1) as f64).floor() as usize).min(i);
        shuffled.swap(i, j);
    }

    shuffled.truncate(count.min(items.len()));
    shuffled
}
