//! 固定的逻辑集合键
//!
//! 存储层只提供按键的整集合读写，没有查询语言；
//! 引擎和看板通过这些固定键访问各自的集合。

/// 跟踪任务集合（引擎拥有）
pub const FOLLOW_UP_TASKS: &str = "follow_up_tasks";

/// 观察记录集合（引擎拥有，只追加）
pub const FOLLOW_UP_UPDATES: &str = "follow_up_updates";

/// 健康告警集合（引擎拥有）
pub const HEALTH_ALERTS: &str = "health_alerts";

/// 教师监管档案集合
pub const EDUCATOR_MONITORING: &str = "educator_monitoring";

/// 健康记录集合（只读依赖）
pub const HEALTH_RECORDS: &str = "health_records";

/// 动物信息集合（只读依赖）
pub const ANIMALS: &str = "animals";

/// 日志条目集合（只读依赖）
pub const JOURNAL_ENTRIES: &str = "journal_entries";

/// 学生档案集合（只读依赖）
pub const STUDENT_PROFILES: &str = "student_profiles";
