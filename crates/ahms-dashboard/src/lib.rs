//! # AHMS看板聚合
//!
//! 在跟踪任务引擎和只读引用数据之上构建跨实体汇总：
//! - 学生健康概览：活跃任务、近期完成、绩效指标、截止提醒和建议
//! - 章节健康指标：活跃病例、紧急关注、过期任务等面向教师的汇总
//! - 能力标准进度：基于日志条目和任务能力标准的确定性评分

pub mod metrics;
pub mod service;

// 重新导出主要类型
pub use metrics::{
    calculate_competency_progress, calculate_engagement_score, calculate_response_rate,
    count_alerts, AlertSummary, CompetencyProgress,
};
pub use service::{
    ChapterHealthMetrics, CurrentIssue, DashboardService, PerformanceMetrics,
    StudentHealthOverview,
};
