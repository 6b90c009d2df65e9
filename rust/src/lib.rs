//! Precedence-constrained task scheduling on identical machines.
//!
//! Provides a Coffman-Graham list scheduler, a discrete-event (Fujii)
//! scheduler, a Sethi-Ullman linearizer and a Gabow SCC cycle validator,
//! all over a precedence relation where `u -> v` means `u` finishes before
//! `v` starts. The same operations are exported to Python as `precsched.rust`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;
use std::collections::{HashMap, HashSet};

mod config;
mod error;
pub mod gabow;
pub mod graph;
mod interner;
pub mod logging;
mod models;
pub mod request;
pub mod scheduler;
pub mod sethi_ullman;
#[cfg(test)]
mod test_support;

pub use config::SchedulingConfig;
pub use error::SchedulerError;
pub use gabow::{strongly_connected_components, validate_acyclic, validate_graph};
pub use graph::{build_graph, Adjacency, PrecedenceGraph, Relation};
pub use interner::{VertexId, VertexIndex};
pub use models::{Schedule, ScheduledTask, Task, TaskId, TaskInput, Time};
pub use request::{build_tasks, schedule_request, Algorithm};
pub use scheduler::{schedule_coffman_graham, schedule_fujii};
pub use sethi_ullman::{linearize_graph, linearize_sethi_ullman};

// Note: std HashMap/HashSet at the Python boundary, FxHash inside.
type PyRelation = HashMap<TaskId, HashSet<TaskId>>;

fn to_py_err(err: SchedulerError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(err.to_string())
}

fn relation_from_py(relation: PyRelation) -> Relation {
    relation
        .into_iter()
        .map(|(id, targets)| (id, targets.into_iter().collect()))
        .collect()
}

fn adjacency_to_py(adjacency: Adjacency) -> PyRelation {
    adjacency
        .into_iter()
        .map(|(id, targets)| (id, targets.into_iter().collect()))
        .collect()
}

/// Build total successor and predecessor maps from a relation.
///
/// # Arguments
/// * `relation` - Dict mapping each task ID to the IDs that must run after it
///
/// # Returns
/// * Tuple `(successors, predecessors)`, both with an entry for every ID seen
#[pyfunction]
#[pyo3(name = "build_graph")]
fn py_build_graph(relation: PyRelation) -> (PyRelation, PyRelation) {
    let (successors, predecessors) = build_graph(&relation_from_py(relation));
    (adjacency_to_py(successors), adjacency_to_py(predecessors))
}

/// Strongly connected components of a successor map (Gabow's algorithm).
#[pyfunction]
#[pyo3(name = "strongly_connected_components", signature = (successors, verbosity=0))]
fn py_strongly_connected_components(
    successors: PyRelation,
    verbosity: u8,
) -> Vec<Vec<TaskId>> {
    let graph = PrecedenceGraph::from_relation(&relation_from_py(successors));
    strongly_connected_components(&graph, verbosity)
}

/// Check that a relation is acyclic.
///
/// # Raises
/// * ValueError naming the cycle members if a cycle is found
#[pyfunction]
#[pyo3(name = "validate_acyclic", signature = (relation, detect_self_loops=true))]
fn py_validate_acyclic(relation: PyRelation, detect_self_loops: bool) -> PyResult<()> {
    let graph = PrecedenceGraph::from_relation(&relation_from_py(relation));
    validate_graph(&graph, detect_self_loops, 0).map_err(to_py_err)
}

/// Copy `tasks` out of their Python objects, run `scheduler`, and write the
/// resulting placements back into those objects.
fn schedule_in_place<F>(
    py: Python<'_>,
    tasks: &[Py<Task>],
    scheduler: F,
) -> PyResult<Vec<Vec<Task>>>
where
    F: FnOnce(&mut [Task]) -> Result<Schedule, SchedulerError>,
{
    let mut records = tasks
        .iter()
        .map(|task| Ok(Task::clone(&*task.try_borrow(py)?)))
        .collect::<PyResult<Vec<Task>>>()?;
    let schedule = scheduler(&mut records).map_err(to_py_err)?;
    for (task, record) in tasks.iter().zip(records) {
        *task.try_borrow_mut(py)? = record;
    }
    Ok(schedule.into_machines())
}

/// Schedule tasks with the Coffman-Graham list scheduler.
///
/// # Arguments
/// * `tasks` - Tasks to schedule; each gets `start_time`, `end_time` and `machine` set
/// * `relation` - Dict mapping each task ID to the IDs that must run after it
/// * `machines` - Number of identical machines
/// * `verbosity` - Logging level (0-3)
///
/// # Returns
/// * One list of placed tasks per machine, in placement order
///
/// # Raises
/// * ValueError on duplicate/unknown IDs, cycles, overflowing end times, or
///   no machines; the input tasks are then left unchanged
#[pyfunction]
#[pyo3(name = "schedule_coffman_graham", signature = (tasks, relation, machines=2, verbosity=0))]
fn py_schedule_coffman_graham(
    py: Python<'_>,
    tasks: Vec<Py<Task>>,
    relation: PyRelation,
    machines: usize,
    verbosity: u8,
) -> PyResult<Vec<Vec<Task>>> {
    let relation = relation_from_py(relation);
    schedule_in_place(py, &tasks, |records| {
        schedule_coffman_graham(records, &relation, machines, verbosity)
    })
}

/// Schedule tasks with the discrete-event (Fujii) scheduler.
///
/// Placements are written into the given tasks, as for `schedule_coffman_graham`.
///
/// # Raises
/// * ValueError on duplicate IDs, overflowing end times, or when the
///   simulation stalls; the input tasks are then left unchanged
#[pyfunction]
#[pyo3(name = "schedule_fujii", signature = (tasks, relation, machines=2, verbosity=0))]
fn py_schedule_fujii(
    py: Python<'_>,
    tasks: Vec<Py<Task>>,
    relation: PyRelation,
    machines: usize,
    verbosity: u8,
) -> PyResult<Vec<Vec<Task>>> {
    let relation = relation_from_py(relation);
    schedule_in_place(py, &tasks, |records| {
        schedule_fujii(records, &relation, machines, verbosity)
    })
}

/// Linearize a DAG with the Sethi-Ullman register-need heuristic.
///
/// # Raises
/// * ValueError if the graph contains a cycle
#[pyfunction]
#[pyo3(name = "linearize_sethi_ullman", signature = (successors, predecessors, verbosity=0))]
fn py_linearize_sethi_ullman(
    successors: PyRelation,
    predecessors: PyRelation,
    verbosity: u8,
) -> PyResult<Vec<TaskId>> {
    linearize_sethi_ullman(
        &relation_from_py(successors),
        &relation_from_py(predecessors),
        verbosity,
    )
    .map_err(to_py_err)
}

/// Validate task definitions and schedule them.
///
/// # Arguments
/// * `tasks` - Task definitions, each listing its predecessors
/// * `algorithm` - "coffman_graham" (alias "coffman") or "fujii"
/// * `config` - Scheduling configuration (machines, verbosity, cycle checks)
///
/// # Returns
/// * One list of scheduled tasks per machine, sorted by start time
///
/// # Raises
/// * ValueError on invalid input, unknown algorithm, cycles, or stalls
#[pyfunction]
#[pyo3(name = "schedule", signature = (tasks, algorithm="coffman_graham", config=None))]
fn py_schedule(
    tasks: Vec<TaskInput>,
    algorithm: &str,
    config: Option<SchedulingConfig>,
) -> PyResult<Vec<Vec<ScheduledTask>>> {
    let algorithm: Algorithm = algorithm.parse().map_err(to_py_err)?;
    let config = config.unwrap_or_default();
    schedule_request(&tasks, algorithm, &config).map_err(to_py_err)
}

/// The precsched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<TaskInput>()?;
    m.add_class::<ScheduledTask>()?;

    // Config types
    m.add_class::<SchedulingConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_build_graph, m)?)?;
    m.add_function(wrap_pyfunction!(py_strongly_connected_components, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate_acyclic, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule_coffman_graham, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule_fujii, m)?)?;
    m.add_function(wrap_pyfunction!(py_linearize_sethi_ullman, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule, m)?)?;

    Ok(())
}
