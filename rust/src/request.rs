//! Request handling: validate task definitions, run one scheduler, shape the result.

use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SchedulingConfig;
use crate::error::SchedulerError;
use crate::gabow::validate_graph;
use crate::graph::{PrecedenceGraph, Relation};
use crate::log_changes;
use crate::models::{ScheduledTask, Task, TaskId, TaskInput};
use crate::scheduler::{schedule_coffman_graham, schedule_fujii};

/// Machine scheduling algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    CoffmanGraham,
    Fujii,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CoffmanGraham => "coffman_graham",
            Self::Fujii => "fujii",
        }
    }
}

impl FromStr for Algorithm {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coffman_graham" | "coffman" => Ok(Self::CoffmanGraham),
            "fujii" => Ok(Self::Fujii),
            other => Err(SchedulerError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Turn task definitions into task records and a `u -> v` relation.
///
/// Inputs list predecessors per task; the relation is keyed the other way
/// round, by the task that must finish first. Every task gets a relation
/// entry, possibly empty.
///
/// # Errors
/// * `InvalidDuration` for a zero duration
/// * `DuplicateTask` for a repeated id
/// * `UnknownPredecessor` for a predecessor with no definition
pub fn build_tasks(inputs: &[TaskInput]) -> Result<(Vec<Task>, Relation), SchedulerError> {
    let mut tasks = Vec::with_capacity(inputs.len());
    let mut ids: FxHashSet<TaskId> =
        FxHashSet::with_capacity_and_hasher(inputs.len(), Default::default());

    for input in inputs {
        if input.duration == 0 {
            return Err(SchedulerError::InvalidDuration(input.id));
        }
        if !ids.insert(input.id) {
            return Err(SchedulerError::DuplicateTask(input.id));
        }
        tasks.push(Task::new(input.id, input.duration));
    }

    let mut relation: Relation =
        FxHashMap::with_capacity_and_hasher(inputs.len(), Default::default());
    for input in inputs {
        relation.entry(input.id).or_default();
        for &predecessor in &input.predecessors {
            if !ids.contains(&predecessor) {
                return Err(SchedulerError::UnknownPredecessor {
                    task: input.id,
                    predecessor,
                });
            }
            relation.entry(predecessor).or_default().insert(input.id);
        }
    }

    Ok((tasks, relation))
}

/// Schedule a batch of task definitions with the chosen algorithm.
///
/// Returns one list per machine, each sorted by start time.
pub fn schedule_request(
    inputs: &[TaskInput],
    algorithm: Algorithm,
    config: &SchedulingConfig,
) -> Result<Vec<Vec<ScheduledTask>>, SchedulerError> {
    config.validate()?;
    let (mut tasks, relation) = build_tasks(inputs)?;

    if config.check_cycles {
        let graph = PrecedenceGraph::from_relation(&relation);
        validate_graph(&graph, config.detect_self_loops, config.verbosity)?;
    }

    log_changes!(
        config.verbosity,
        "Scheduling {} tasks on {} machines with {}",
        tasks.len(),
        config.machines,
        algorithm.name()
    );

    let schedule = match algorithm {
        Algorithm::CoffmanGraham => {
            schedule_coffman_graham(&mut tasks, &relation, config.machines, config.verbosity)?
        }
        Algorithm::Fujii => {
            schedule_fujii(&mut tasks, &relation, config.machines, config.verbosity)?
        }
    };

    Ok(schedule
        .sorted_by_start()
        .iter()
        .map(|machine| machine.iter().filter_map(ScheduledTask::from_task).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: TaskId, duration: u64, predecessors: &[TaskId]) -> TaskInput {
        TaskInput::new(id, duration, predecessors.to_vec())
    }

    fn sample_inputs() -> Vec<TaskInput> {
        vec![
            input(1, 2, &[]),
            input(2, 1, &[]),
            input(3, 2, &[1, 2]),
            input(4, 1, &[3]),
        ]
    }

    fn find(result: &[Vec<ScheduledTask>], id: TaskId) -> &ScheduledTask {
        result.iter().flatten().find(|t| t.id == id).unwrap()
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("coffman_graham".parse::<Algorithm>(), Ok(Algorithm::CoffmanGraham));
        assert_eq!("coffman".parse::<Algorithm>(), Ok(Algorithm::CoffmanGraham));
        assert_eq!("fujii".parse::<Algorithm>(), Ok(Algorithm::Fujii));
        assert_eq!(
            "random".parse::<Algorithm>(),
            Err(SchedulerError::UnknownAlgorithm("random".to_string()))
        );
        assert_eq!(Algorithm::Fujii.name(), "fujii");
    }

    #[test]
    fn test_relation_is_keyed_by_predecessor() {
        let (tasks, relation) = build_tasks(&sample_inputs()).unwrap();

        assert_eq!(tasks.len(), 4);
        assert_eq!(relation[&1], FxHashSet::from_iter([3]));
        assert_eq!(relation[&2], FxHashSet::from_iter([3]));
        assert_eq!(relation[&3], FxHashSet::from_iter([4]));
        assert!(relation[&4].is_empty());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(
            build_tasks(&[input(1, 1, &[]), input(1, 2, &[])]).unwrap_err(),
            SchedulerError::DuplicateTask(1)
        );
        assert_eq!(
            build_tasks(&[input(1, 1, &[5])]).unwrap_err(),
            SchedulerError::UnknownPredecessor {
                task: 1,
                predecessor: 5
            }
        );
        assert_eq!(
            build_tasks(&[input(1, 0, &[])]).unwrap_err(),
            SchedulerError::InvalidDuration(1)
        );
    }

    #[test]
    fn test_coffman_graham_request() {
        let result = schedule_request(
            &sample_inputs(),
            Algorithm::CoffmanGraham,
            &SchedulingConfig::default(),
        )
        .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(find(&result, 1).start_time, 0);
        assert_eq!(find(&result, 2).start_time, 0);
        assert_eq!(find(&result, 3).start_time, 2);
        assert_eq!(find(&result, 4).start_time, 4);
        assert_eq!(find(&result, 4).end_time, 5);
        for machine in &result {
            for pair in machine.windows(2) {
                assert!(pair[0].start_time <= pair[1].start_time);
                assert!(pair[0].end_time <= pair[1].start_time);
            }
        }
    }

    #[test]
    fn test_fujii_request() {
        let config = SchedulingConfig {
            machines: 3,
            ..SchedulingConfig::default()
        };
        let result = schedule_request(&sample_inputs(), Algorithm::Fujii, &config).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.iter().map(Vec::len).sum::<usize>(), 4);
        assert!(find(&result, 1).end_time <= find(&result, 3).start_time);
        assert!(find(&result, 2).end_time <= find(&result, 3).start_time);
        assert!(find(&result, 3).end_time <= find(&result, 4).start_time);
    }

    #[test]
    fn test_cycle_rejected_before_scheduling() {
        let inputs = vec![input(1, 1, &[2]), input(2, 1, &[1])];
        let result = schedule_request(&inputs, Algorithm::Fujii, &SchedulingConfig::default());
        assert_eq!(result, Err(SchedulerError::CycleDetected(vec![1, 2])));
    }

    #[test]
    fn test_cycle_surfaces_as_stall_without_precheck() {
        let inputs = vec![input(1, 1, &[2]), input(2, 1, &[1])];
        let config = SchedulingConfig {
            check_cycles: false,
            ..SchedulingConfig::default()
        };
        let result = schedule_request(&inputs, Algorithm::Fujii, &config);
        assert!(matches!(result, Err(SchedulerError::Stalled { .. })));
    }

    #[test]
    fn test_zero_machines_rejected() {
        let config = SchedulingConfig {
            machines: 0,
            ..SchedulingConfig::default()
        };
        let result = schedule_request(&sample_inputs(), Algorithm::CoffmanGraham, &config);
        assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
    }
}
