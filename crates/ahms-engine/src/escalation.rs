//! 升级检测
//!
//! 根据学生提交的观察记录判断任务是否需要升级为紧急优先级

use ahms_core::{ConditionAssessment, FollowUpUpdate};

/// 触发升级的关注等级阈值
pub const CONCERN_LEVEL_THRESHOLD: u8 = 4;

/// 触发升级的观察文本关键词（不区分大小写的子串匹配）
pub static ESCALATION_KEYWORDS: &[&str] =
    &["emergency", "severe", "critical", "urgent", "distress"];

/// 评估观察记录的升级触发条件
///
/// 三个相互独立的判定：关注等级达到阈值；状况评估为恶化；
/// 观察描述或学生备注中出现升级关键词。任一成立即返回触发原因。
pub fn check_escalation_triggers(update: &FollowUpUpdate) -> Option<String> {
    if update.concern_level >= CONCERN_LEVEL_THRESHOLD {
        return Some(format!(
            "concern level {} at or above threshold {}",
            update.concern_level, CONCERN_LEVEL_THRESHOLD
        ));
    }

    if update.condition_assessment == ConditionAssessment::Worse {
        return Some("condition assessed as worse".to_string());
    }

    if let Some(keyword) = find_keyword(&update.observations) {
        return Some(format!("keyword '{}' found in observations", keyword));
    }
    if let Some(notes) = &update.student_notes {
        if let Some(keyword) = find_keyword(notes) {
            return Some(format!("keyword '{}' found in student notes", keyword));
        }
    }

    None
}

fn find_keyword(text: &str) -> Option<&'static str> {
    let normalized = ahms_core::utils::normalize_for_matching(text);
    ESCALATION_KEYWORDS
        .iter()
        .find(|keyword| normalized.contains(*keyword))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahms_core::{FollowUpUpdate, ReviewStatus};
    use chrono::Utc;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn sample_update(
        concern_level: u8,
        assessment: ConditionAssessment,
        observations: &str,
        student_notes: Option<&str>,
    ) -> FollowUpUpdate {
        FollowUpUpdate {
            id: Uuid::new_v4(),
            follow_up_task_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            update_date: Utc::now(),
            observations: observations.to_string(),
            student_notes: student_notes.map(|n| n.to_string()),
            measurements: HashMap::new(),
            photos: Vec::new(),
            condition_assessment: assessment,
            concern_level,
            confidence_level: 3,
            update_completeness_score: 0.25,
            review_status: ReviewStatus::Pending,
        }
    }

    #[test]
    fn test_concern_level_threshold_triggers() {
        let update = sample_update(4, ConditionAssessment::Same, "eating normally", None);
        assert!(check_escalation_triggers(&update).is_some());

        let update = sample_update(5, ConditionAssessment::Improved, "eating normally", None);
        assert!(check_escalation_triggers(&update).is_some());

        let update = sample_update(3, ConditionAssessment::Same, "eating normally", None);
        assert!(check_escalation_triggers(&update).is_none());
    }

    #[test]
    fn test_worse_assessment_triggers() {
        let update = sample_update(1, ConditionAssessment::Worse, "less active today", None);
        assert!(check_escalation_triggers(&update).is_some());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let update = sample_update(2, ConditionAssessment::Same, "animal in SEVERE pain", None);
        assert!(check_escalation_triggers(&update).is_some());

        let update = sample_update(2, ConditionAssessment::Same, "looks fine", Some("signs of Distress overnight"));
        assert!(check_escalation_triggers(&update).is_some());
    }

    #[test]
    fn test_benign_update_does_not_trigger() {
        // 关注等级3 + 状况不变 + 无关键词 -> 不升级
        let update = sample_update(3, ConditionAssessment::Same, "mild swelling", None);
        assert!(check_escalation_triggers(&update).is_none());
    }

    #[test]
    fn test_keyword_matches_as_substring() {
        let update = sample_update(1, ConditionAssessment::Same, "urgently needs water refill", None);
        // "urgent" 是 "urgently" 的子串
        assert!(check_escalation_triggers(&update).is_some());
    }
}
