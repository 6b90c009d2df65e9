//! Error type shared by the graph algorithms, schedulers and request layer.

use thiserror::Error;

use crate::models::TaskId;

/// Errors that can occur while validating, scheduling or linearizing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Cycle detected in tasks: {0:?}")]
    CycleDetected(Vec<TaskId>),
    #[error("No machine could be selected for task {0}")]
    InfeasibleAssignment(TaskId),
    #[error("Scheduling stalled at {finished}/{total} finished tasks; pending: {pending:?}")]
    Stalled {
        finished: usize,
        total: usize,
        pending: Vec<TaskId>,
    },
    #[error("End time of task {0} does not fit in the time range")]
    TimeOverflow(TaskId),
    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),
    #[error("Precedence relation references unknown task id: {0}")]
    UnknownTask(TaskId),
    #[error("Unknown predecessor id {predecessor} for task {task}")]
    UnknownPredecessor { task: TaskId, predecessor: TaskId },
    #[error("Task {0} must have a positive duration")]
    InvalidDuration(TaskId),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl SchedulerError {
    /// Whether this error belongs to the referential class (bad ids in the input).
    pub fn is_referential(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTask(_) | Self::UnknownTask(_) | Self::UnknownPredecessor { .. }
        )
    }
}
