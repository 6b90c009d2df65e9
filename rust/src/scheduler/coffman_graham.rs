//! Coffman-Graham style list scheduling.
//!
//! Tasks receive sequential labels from a topological sweep that always
//! takes the ready vertex with the smallest id, then are placed in label
//! order on whichever machine lets them start earliest.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::SchedulerError;
use crate::gabow::validate_graph;
use crate::graph::{PrecedenceGraph, Relation};
use crate::interner::VertexId;
use crate::models::{Schedule, Task, Time};
use crate::{log_changes, log_checks, log_debug};

use super::index_tasks;

/// Label every vertex with its rank in the smallest-id-first topological order.
///
/// Labels start at 1. Vertices that never become ready sit on or behind a
/// cycle; the cycle is reported instead of a partial labeling.
fn assign_labels(graph: &PrecedenceGraph, verbosity: u8) -> Result<Vec<usize>, SchedulerError> {
    let mut in_degree: Vec<usize> = graph
        .vertices()
        .map(|v| graph.predecessors(v).len())
        .collect();
    let mut ready: BinaryHeap<Reverse<VertexId>> = graph
        .vertices()
        .filter(|&v| in_degree[v as usize] == 0)
        .map(Reverse)
        .collect();

    let mut labels = vec![0; graph.len()];
    let mut next_label = 1;

    while let Some(Reverse(v)) = ready.pop() {
        labels[v as usize] = next_label;
        log_debug!(verbosity, "Label {} -> task {}", next_label, graph.id(v));
        next_label += 1;

        for &w in graph.successors(v) {
            in_degree[w as usize] -= 1;
            if in_degree[w as usize] == 0 {
                ready.push(Reverse(w));
            }
        }
    }

    if next_label <= graph.len() {
        validate_graph(graph, true, verbosity)?;
        let blocked = graph.sorted_ids(graph.vertices().filter(|&v| labels[v as usize] == 0));
        return Err(SchedulerError::CycleDetected(blocked));
    }

    Ok(labels)
}

/// Pick the machine on which a task can start earliest.
///
/// Returns `(machine, start)`; ties go to the lowest machine index. `None`
/// only when there are no machines.
fn select_machine(machine_free: &[Time], earliest_start: Time) -> Option<(usize, Time)> {
    let mut best: Option<(usize, Time)> = None;
    for (machine, &free) in machine_free.iter().enumerate() {
        let available = free.max(earliest_start);
        if best.map_or(true, |(_, start)| available < start) {
            best = Some((machine, available));
        }
    }
    best
}

/// Schedule `tasks` on `machine_count` machines with Coffman-Graham labels.
///
/// Every id in `relation` must belong to a task. On success each task record
/// carries its placement and the same placements are returned per machine.
///
/// # Errors
/// * `DuplicateTask` / `UnknownTask` for inconsistent ids
/// * `CycleDetected` if the relation is not acyclic
/// * `InfeasibleAssignment` if no machine can be selected (`machine_count == 0`)
/// * `TimeOverflow` if an end time does not fit in `Time`
pub fn schedule_coffman_graham(
    tasks: &mut [Task],
    relation: &Relation,
    machine_count: usize,
    verbosity: u8,
) -> Result<Schedule, SchedulerError> {
    let positions = index_tasks(tasks)?;
    let graph = PrecedenceGraph::with_vertices(relation, tasks.iter().map(|t| t.id));
    if let Some(&unknown) = graph
        .index()
        .ids()
        .iter()
        .find(|&&id| !positions.contains_key(&id))
    {
        return Err(SchedulerError::UnknownTask(unknown));
    }

    let labels = assign_labels(&graph, verbosity)?;
    let mut order: Vec<VertexId> = graph.vertices().collect();
    order.sort_by_key(|&v| (labels[v as usize], graph.id(v)));

    let mut machine_free: Vec<Time> = vec![0; machine_count];
    let mut end_times: Vec<Time> = vec![0; graph.len()];
    let mut schedule = Schedule::with_machines(machine_count);

    for v in order {
        let task = &mut tasks[positions[&graph.id(v)]];

        // Label order is topological, so every predecessor is already placed.
        let earliest_start = graph
            .predecessors(v)
            .iter()
            .map(|&p| end_times[p as usize])
            .max()
            .unwrap_or(0);

        log_checks!(
            verbosity,
            "Considering task {} (label={}, earliest_start={}, machine_free={:?})",
            task.id,
            labels[v as usize],
            earliest_start,
            machine_free
        );

        let Some((machine, start)) = select_machine(&machine_free, earliest_start) else {
            log_changes!(verbosity, "No machine available for task {}", task.id);
            return Err(SchedulerError::InfeasibleAssignment(task.id));
        };

        let end = task.assign(start, machine)?;
        machine_free[machine] = end;
        end_times[v as usize] = end;
        log_changes!(
            verbosity,
            "Scheduled task {} on machine {} from {} to {}",
            task.id,
            machine,
            start,
            end
        );
        schedule.push(machine, task.clone());
    }

    Ok(schedule)
}
