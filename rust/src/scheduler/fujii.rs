//! Discrete-event greedy scheduling with a hard cap of one task per machine.
//!
//! A virtual clock jumps from one completion event to the next. At each
//! event finished tasks release their successors, and ready tasks are handed
//! to idle machines shortest-duration first.

use rustc_hash::FxHashSet;

use crate::error::SchedulerError;
use crate::graph::{PrecedenceGraph, Relation};
use crate::interner::VertexId;
use crate::models::{Schedule, Task, Time};
use crate::{log_changes, log_checks, log_debug};

use super::index_tasks;

/// A task occupying a machine until `end`.
#[derive(Clone, Copy, Debug)]
struct Running {
    end: Time,
    vertex: VertexId,
    machine: usize,
}

/// Schedule `tasks` on `machine_count` machines by simulated dispatch.
///
/// The clock starts at 0 and moves to the earliest pending completion, or
/// by one unit when nothing is running. At no instant do more than
/// `machine_count` tasks run.
///
/// Relation ids without a task record are never finished, so their
/// successors cannot start; that surfaces as `Stalled`.
///
/// # Errors
/// * `DuplicateTask` if two records share an id
/// * `TimeOverflow` if an end time does not fit in `Time`
/// * `Stalled` if nothing is running while unfinished tasks remain (cycles,
///   missing predecessors, or no machines)
pub fn schedule_fujii(
    tasks: &mut [Task],
    relation: &Relation,
    machine_count: usize,
    verbosity: u8,
) -> Result<Schedule, SchedulerError> {
    let positions = index_tasks(tasks)?;
    let graph = PrecedenceGraph::with_vertices(relation, tasks.iter().map(|t| t.id));
    let position_of: Vec<Option<usize>> = graph
        .vertices()
        .map(|v| positions.get(&graph.id(v)).copied())
        .collect();

    let total = tasks.len();
    let mut finished = vec![false; graph.len()];
    let mut finished_count = 0;
    let mut available: FxHashSet<VertexId> = graph
        .vertices()
        .filter(|&v| position_of[v as usize].is_some() && graph.predecessors(v).is_empty())
        .collect();
    let mut in_progress: Vec<Running> = Vec::with_capacity(machine_count);
    // Last completion per machine, for the logs only; `in_progress` decides
    // which machines are free.
    let mut machine_free: Vec<Time> = vec![0; machine_count];
    let mut schedule = Schedule::with_machines(machine_count);
    let mut time: Time = 0;

    while finished_count < total {
        match in_progress.iter().map(|r| r.end).min() {
            Some(next_event) => time = next_event,
            None => time += 1,
        }
        log_changes!(verbosity, "Time: {}", time);

        let (done, running): (Vec<Running>, Vec<Running>) =
            in_progress.into_iter().partition(|r| r.end <= time);
        in_progress = running;

        for entry in done {
            finished[entry.vertex as usize] = true;
            finished_count += 1;
            machine_free[entry.machine] = entry.end;
            log_changes!(
                verbosity,
                "  Finished task {} on machine {}",
                graph.id(entry.vertex),
                entry.machine
            );

            for &successor in graph.successors(entry.vertex) {
                if position_of[successor as usize].is_some()
                    && graph
                        .predecessors(successor)
                        .iter()
                        .all(|&p| finished[p as usize])
                {
                    log_debug!(verbosity, "  Released task {}", graph.id(successor));
                    available.insert(successor);
                }
            }
        }

        let duration_of = |v: VertexId| position_of[v as usize].map_or(0, |pos| tasks[pos].duration);
        let mut ready: Vec<VertexId> = available
            .iter()
            .copied()
            .filter(|&v| !finished[v as usize])
            .collect();
        ready.sort_by_key(|&v| (duration_of(v), graph.id(v)));

        let free_machines: Vec<usize> = (0..machine_count)
            .filter(|&m| in_progress.iter().all(|r| r.machine != m))
            .collect();

        log_checks!(
            verbosity,
            "  Ready: {:?}, free machines: {:?}, machine_free: {:?}",
            graph.sorted_ids(ready.iter().copied()),
            free_machines,
            machine_free
        );

        for (&vertex, &machine) in ready.iter().zip(free_machines.iter()) {
            let Some(position) = position_of[vertex as usize] else {
                continue;
            };
            let task = &mut tasks[position];
            let end = task.assign(time, machine)?;
            log_changes!(
                verbosity,
                "  Scheduled task {} on machine {} from {} to {}",
                task.id,
                machine,
                time,
                end
            );
            in_progress.push(Running {
                end,
                vertex,
                machine,
            });
            schedule.push(machine, task.clone());
            available.remove(&vertex);
        }

        if in_progress.is_empty() && finished_count < total {
            let pending = graph.sorted_ids(
                graph
                    .vertices()
                    .filter(|&v| position_of[v as usize].is_some() && !finished[v as usize]),
            );
            log_changes!(verbosity, "  Stalled with pending tasks {:?}", pending);
            return Err(SchedulerError::Stalled {
                finished: finished_count,
                total,
                pending,
            });
        }
    }

    Ok(schedule)
}
