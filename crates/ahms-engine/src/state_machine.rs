//! 任务状态机
//!
//! 管理跟踪任务完成状态的生命周期转换

use ahms_core::{AhmsError, CompletionStatus, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 任务状态转换事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskEvent {
    FirstUpdate,      // 首次观察记录
    ProgressComplete, // 计算进度达到100
    Completed,        // 显式结案
    Cancelled,        // 取消（分类中存在，引擎内部从不产生）
}

/// 任务状态机
#[derive(Debug)]
pub struct TaskStateMachine {
    transitions: HashMap<(CompletionStatus, TaskEvent), CompletionStatus>,
}

impl TaskStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        // 定义状态转换规则
        transitions.insert(
            (CompletionStatus::Pending, TaskEvent::FirstUpdate),
            CompletionStatus::InProgress,
        );
        transitions.insert(
            (CompletionStatus::Pending, TaskEvent::Completed),
            CompletionStatus::Completed,
        );
        transitions.insert(
            (CompletionStatus::InProgress, TaskEvent::ProgressComplete),
            CompletionStatus::Completed,
        );
        transitions.insert(
            (CompletionStatus::InProgress, TaskEvent::Completed),
            CompletionStatus::Completed,
        );
        transitions.insert(
            (CompletionStatus::Pending, TaskEvent::Cancelled),
            CompletionStatus::Cancelled,
        );
        transitions.insert(
            (CompletionStatus::InProgress, TaskEvent::Cancelled),
            CompletionStatus::Cancelled,
        );

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: CompletionStatus, event: &TaskEvent) -> bool {
        self.transitions.contains_key(&(from, event.clone()))
    }

    /// 执行状态转换
    pub fn transition(&self, from: CompletionStatus, event: &TaskEvent) -> Result<CompletionStatus> {
        match self.transitions.get(&(from, event.clone())) {
            Some(to) => Ok(*to),
            None => Err(AhmsError::InvalidStateTransition {
                from: format!("{:?}", from),
                event: format!("{:?}", event),
            }),
        }
    }

    /// 获取状态的所有可能事件
    pub fn get_possible_events(&self, current_state: CompletionStatus) -> Vec<TaskEvent> {
        self.transitions
            .keys()
            .filter(|(state, _)| *state == current_state)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

impl Default for TaskStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
