//! Fixtures and schedule property checks shared by the unit tests.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::Relation;
use crate::models::{Schedule, Task, TaskId, Time};

pub fn relation(edges: &[(TaskId, Vec<TaskId>)]) -> Relation {
    edges
        .iter()
        .map(|(u, vs)| (*u, vs.iter().copied().collect()))
        .collect()
}

pub fn unit_tasks(ids: impl IntoIterator<Item = TaskId>) -> Vec<Task> {
    ids.into_iter().map(|id| Task::new(id, 1)).collect()
}

/// Every input task appears exactly once across all machines.
pub fn assert_complete(schedule: &Schedule, tasks: &[Task]) {
    let mut scheduled: Vec<TaskId> = schedule.tasks().map(|t| t.id).collect();
    let mut expected: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    scheduled.sort_unstable();
    expected.sort_unstable();
    assert_eq!(scheduled, expected, "scheduled ids differ from input ids");
}

/// Tasks on one machine never overlap, and each sits on the machine it names.
pub fn assert_no_overlap(schedule: &Schedule) {
    for (index, machine) in schedule.machines().iter().enumerate() {
        let mut intervals: Vec<(Time, Time)> = machine
            .iter()
            .map(|t| {
                assert_eq!(t.machine, Some(index), "task {} on wrong machine", t.id);
                (t.start_time.unwrap(), t.end_time.unwrap())
            })
            .collect();
        intervals.sort_unstable();
        for pair in intervals.windows(2) {
            assert!(
                pair[0].1 <= pair[1].0,
                "overlap on machine {index}: {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

/// For every edge `u -> v`, `end(u) <= start(v)`.
pub fn assert_precedence(schedule: &Schedule, relation: &Relation) {
    let placed: FxHashMap<TaskId, &Task> = schedule.tasks().map(|t| (t.id, t)).collect();
    for (u, vs) in relation {
        for v in vs {
            let end_u = placed[u].end_time.unwrap();
            let start_v = placed[v].start_time.unwrap();
            assert!(end_u <= start_v, "edge {u} -> {v} violated: {end_u} > {start_v}");
        }
    }
}

/// At no instant do more than `machines` tasks run.
pub fn assert_capacity(schedule: &Schedule, machines: usize) {
    let instants: FxHashSet<Time> = schedule.tasks().filter_map(|t| t.start_time).collect();
    for instant in instants {
        let running = schedule
            .tasks()
            .filter(|t| t.start_time.unwrap() <= instant && instant < t.end_time.unwrap())
            .count();
        assert!(running <= machines, "{running} tasks running at {instant}");
    }
}

pub fn assert_valid_schedule(schedule: &Schedule, tasks: &[Task], relation: &Relation) {
    assert_complete(schedule, tasks);
    assert_no_overlap(schedule);
    assert_precedence(schedule, relation);
    for task in schedule.tasks() {
        assert_eq!(task.end_time, Some(task.start_time.unwrap() + task.duration));
    }
}
