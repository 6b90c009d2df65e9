//! Core data types for the scheduling system.

use pyo3::prelude::*;

use crate::error::SchedulerError;

/// Caller-supplied task identifier.
pub type TaskId = i64;

/// Discrete time unit used for durations and start/end times.
pub type Time = u64;

/// A task to be scheduled.
///
/// `start_time`, `end_time` and `machine` are unset until a scheduler places
/// the task; afterwards `end_time == start_time + duration`.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: TaskId,
    #[pyo3(get, set)]
    pub duration: Time,
    #[pyo3(get, set)]
    pub start_time: Option<Time>,
    #[pyo3(get, set)]
    pub end_time: Option<Time>,
    #[pyo3(get, set)]
    pub machine: Option<usize>,
}

impl Task {
    pub fn new(id: TaskId, duration: Time) -> Self {
        Self {
            id,
            duration,
            start_time: None,
            end_time: None,
            machine: None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some() && self.machine.is_some()
    }

    /// Place the task on `machine` starting at `start` and return its end time.
    ///
    /// The record is left untouched if the end time does not fit in `Time`.
    pub(crate) fn assign(&mut self, start: Time, machine: usize) -> Result<Time, SchedulerError> {
        let end = start
            .checked_add(self.duration)
            .ok_or(SchedulerError::TimeOverflow(self.id))?;
        self.start_time = Some(start);
        self.end_time = Some(end);
        self.machine = Some(machine);
        Ok(end)
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (id, duration=1))]
    fn py_new(id: TaskId, duration: Time) -> Self {
        Self::new(id, duration)
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, duration={}, start={:?}, end={:?}, machine={:?})",
            self.id, self.duration, self.start_time, self.end_time, self.machine
        )
    }
}

/// Per-machine result of a scheduler run.
///
/// Each inner list holds the tasks placed on that machine in placement order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    machines: Vec<Vec<Task>>,
}

impl Schedule {
    pub fn with_machines(machine_count: usize) -> Self {
        Self {
            machines: vec![Vec::new(); machine_count],
        }
    }

    pub(crate) fn push(&mut self, machine: usize, task: Task) {
        self.machines[machine].push(task);
    }

    pub fn machines(&self) -> &[Vec<Task>] {
        &self.machines
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    pub fn task_count(&self) -> usize {
        self.machines.iter().map(Vec::len).sum()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.machines.iter().flatten()
    }

    /// Maximum end time over all placed tasks (0 for an empty schedule).
    pub fn makespan(&self) -> Time {
        self.tasks().filter_map(|t| t.end_time).max().unwrap_or(0)
    }

    /// Consume the schedule, ordering each machine's tasks by start time.
    pub fn sorted_by_start(mut self) -> Vec<Vec<Task>> {
        for machine in &mut self.machines {
            machine.sort_by_key(|t| (t.start_time, t.id));
        }
        self.machines
    }

    pub fn into_machines(self) -> Vec<Vec<Task>> {
        self.machines
    }
}

/// A task definition as submitted to the request layer.
///
/// Dependencies are listed from the task's point of view: each entry of
/// `predecessors` must finish before this task starts.
#[pyclass]
#[derive(Clone, Debug)]
pub struct TaskInput {
    #[pyo3(get, set)]
    pub id: TaskId,
    #[pyo3(get, set)]
    pub duration: Time,
    #[pyo3(get, set)]
    pub predecessors: Vec<TaskId>,
}

impl TaskInput {
    pub fn new(id: TaskId, duration: Time, predecessors: Vec<TaskId>) -> Self {
        Self {
            id,
            duration,
            predecessors,
        }
    }
}

#[pymethods]
impl TaskInput {
    #[new]
    #[pyo3(signature = (id, duration=1, predecessors=vec![]))]
    fn py_new(id: TaskId, duration: Time, predecessors: Vec<TaskId>) -> Self {
        Self::new(id, duration, predecessors)
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskInput(id={}, duration={}, predecessors={:?})",
            self.id, self.duration, self.predecessors
        )
    }
}

/// A placed task as returned by the request layer.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    #[pyo3(get)]
    pub id: TaskId,
    #[pyo3(get)]
    pub start_time: Time,
    #[pyo3(get)]
    pub end_time: Time,
    #[pyo3(get)]
    pub machine: usize,
}

impl ScheduledTask {
    /// Snapshot a placed task; `None` if the scheduler never placed it.
    pub fn from_task(task: &Task) -> Option<Self> {
        Some(Self {
            id: task.id,
            start_time: task.start_time?,
            end_time: task.end_time?,
            machine: task.machine?,
        })
    }
}

#[pymethods]
impl ScheduledTask {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(id={}, start={}, end={}, machine={})",
            self.id, self.start_time, self.end_time, self.machine
        )
    }
}
