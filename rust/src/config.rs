//! Configuration types for the scheduling system.

use pyo3::prelude::*;

use crate::error::SchedulerError;

/// Configuration for a scheduling request.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SchedulingConfig {
    /// Number of identical machines
    #[pyo3(get, set)]
    pub machines: usize,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Run the cycle validator before scheduling
    #[pyo3(get, set)]
    pub check_cycles: bool,
    /// Treat a task that precedes itself as a cycle
    #[pyo3(get, set)]
    pub detect_self_loops: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            machines: 2,
            verbosity: 0,
            check_cycles: true,
            detect_self_loops: true,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.machines == 0 {
            return Err(SchedulerError::InvalidConfig(
                "machines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[pymethods]
impl SchedulingConfig {
    #[new]
    #[pyo3(signature = (
        machines=None,
        verbosity=None,
        check_cycles=None,
        detect_self_loops=None
    ))]
    fn new(
        machines: Option<usize>,
        verbosity: Option<u8>,
        check_cycles: Option<bool>,
        detect_self_loops: Option<bool>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            machines: machines.unwrap_or(defaults.machines),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            check_cycles: check_cycles.unwrap_or(defaults.check_cycles),
            detect_self_loops: detect_self_loops.unwrap_or(defaults.detect_self_loops),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SchedulingConfig(machines={}, verbosity={}, check_cycles={}, detect_self_loops={})",
            self.machines, self.verbosity, self.check_cycles, self.detect_self_loops
        )
    }
}
