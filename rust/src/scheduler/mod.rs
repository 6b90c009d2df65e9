//! Machine schedulers.
//!
//! Both schedulers place every task on one of `machine_count` identical
//! machines, write `start_time`/`end_time`/`machine` into the task records,
//! and return the placements grouped per machine.

mod coffman_graham;
mod fujii;

pub use coffman_graham::schedule_coffman_graham;
pub use fujii::schedule_fujii;

use rustc_hash::FxHashMap;

use crate::error::SchedulerError;
use crate::models::{Task, TaskId};

/// Map each task id to its position in `tasks`, rejecting duplicate ids.
fn index_tasks(tasks: &[Task]) -> Result<FxHashMap<TaskId, usize>, SchedulerError> {
    let mut positions = FxHashMap::with_capacity_and_hasher(tasks.len(), Default::default());
    for (position, task) in tasks.iter().enumerate() {
        if positions.insert(task.id, position).is_some() {
            return Err(SchedulerError::DuplicateTask(task.id));
        }
    }
    Ok(positions)
}
