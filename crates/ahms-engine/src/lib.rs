//! # AHMS跟踪任务引擎
//!
//! 提供完整的动物健康跟踪任务管理功能，包括：
//! - 任务状态机：管理跟踪任务的完整生命周期
//! - 进度计算：根据观察记录数量和任务频率派生完成进度
//! - 升级检测：从学生提交的信号中识别需要紧急关注的病例
//! - 健康告警：面向学生和教师的通知记录及其确认/解决生命周期

pub mod engine;
pub mod escalation;
pub mod progress;
pub mod state_machine;

// 重新导出主要类型
pub use engine::{AlertDraft, FollowUpEngine, TaskDraft, UpdateDraft};
pub use escalation::{check_escalation_triggers, CONCERN_LEVEL_THRESHOLD, ESCALATION_KEYWORDS};
pub use progress::{completeness_score, expected_updates, progress_percentage};
pub use state_machine::{TaskEvent, TaskStateMachine};
