//! 任务进度计算
//!
//! 根据观察记录数量和任务频率计算完成进度

use ahms_core::TaskFrequency;
use std::collections::HashMap;

/// 任务在整个周期内预期的观察记录数量
///
/// daily: 每天一次；twice_daily: 每天两次；weekly: 每周一次（按周上取整）；
/// once/custom: 整个周期一次。
pub fn expected_updates(frequency: TaskFrequency, duration_days: u32) -> u32 {
    let expected = match frequency {
        TaskFrequency::Daily => duration_days,
        TaskFrequency::TwiceDaily => duration_days * 2,
        TaskFrequency::Weekly => duration_days.div_ceil(7),
        TaskFrequency::Once | TaskFrequency::Custom => 1,
    };
    expected.max(1)
}

/// 进度百分比: min(100, 100 × 记录数 / 预期记录数)
pub fn progress_percentage(update_count: usize, expected: u32) -> f64 {
    let raw = 100.0 * update_count as f64 / expected as f64;
    raw.min(100.0)
}

/// 观察记录完整度评分 [0, 1]
///
/// 四个组成部分各占0.25：观察描述、测量数据、照片、学生备注。
pub fn completeness_score(
    observations: &str,
    student_notes: Option<&str>,
    measurements: &HashMap<String, f64>,
    photos: &[String],
) -> f64 {
    let mut score = 0.0;
    if !observations.trim().is_empty() {
        score += 0.25;
    }
    if !measurements.is_empty() {
        score += 0.25;
    }
    if !photos.is_empty() {
        score += 0.25;
    }
    if student_notes.map(|n| !n.trim().is_empty()).unwrap_or(false) {
        score += 0.25;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_updates_by_frequency() {
        assert_eq!(expected_updates(TaskFrequency::Daily, 5), 5);
        assert_eq!(expected_updates(TaskFrequency::TwiceDaily, 5), 10);
        assert_eq!(expected_updates(TaskFrequency::Weekly, 10), 2);
        assert_eq!(expected_updates(TaskFrequency::Once, 30), 1);
        assert_eq!(expected_updates(TaskFrequency::Custom, 14), 1);
    }

    #[test]
    fn test_expected_updates_never_zero() {
        assert_eq!(expected_updates(TaskFrequency::Daily, 0), 1);
        assert_eq!(expected_updates(TaskFrequency::Weekly, 0), 1);
    }

    #[test]
    fn test_progress_percentage() {
        // daily / 4天: 2次记录 -> 50%
        assert_eq!(progress_percentage(2, 4), 50.0);
        // 第4次记录 -> 100%
        assert_eq!(progress_percentage(4, 4), 100.0);
        // 超出预期的记录封顶在100
        assert_eq!(progress_percentage(7, 4), 100.0);
        // daily / 3天: 1次记录 -> 约33.33%
        let p = progress_percentage(1, 3);
        assert!((p - 33.333333).abs() < 0.001);
    }

    #[test]
    fn test_completeness_score_components() {
        let empty = HashMap::new();
        let mut measurements = HashMap::new();
        measurements.insert("weight_kg".to_string(), 42.5);
        let photos = vec!["photos/day1.jpg".to_string()];

        assert_eq!(completeness_score("", None, &empty, &[]), 0.0);
        assert_eq!(completeness_score("limping on left leg", None, &empty, &[]), 0.25);
        assert_eq!(
            completeness_score("limping on left leg", Some("vet visit booked"), &measurements, &photos),
            1.0
        );
        // 空白备注不计分
        assert_eq!(completeness_score("ok", Some("   "), &empty, &[]), 0.25);
    }
}
