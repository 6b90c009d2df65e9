//! Verbosity-gated logging for the scheduling algorithms.
//!
//! All output goes to stderr and costs a single integer comparison when the
//! level is disabled. Levels:
//! - 0: SILENT
//! - 1: CHANGES (placements, completions, clock advances)
//! - 2: CHECKS (machine scans, ready lists, leaf choices)
//! - 3: DEBUG (labels, SCC stack pops, register-need memo fills)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Shared body of the level macros; prefixes each line with its level tag.
#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($verbosity:expr, $level:expr, $tag:literal, $($arg:tt)*) => {
        if $verbosity >= $level {
            eprintln!(concat!("[", $tag, "] {}"), format_args!($($arg)*));
        }
    };
}

/// Log a state change: a task placed, a task finished, the clock moved.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($verbosity, $crate::logging::VERBOSITY_CHANGES, "changes", $($arg)*)
    };
}

/// Log a decision input: which machines or leaves were considered.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($verbosity, $crate::logging::VERBOSITY_CHECKS, "checks", $($arg)*)
    };
}

/// Log algorithm internals.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($verbosity, $crate::logging::VERBOSITY_DEBUG, "debug", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_CHANGES);
        assert!(VERBOSITY_CHANGES < VERBOSITY_CHECKS);
        assert!(VERBOSITY_CHECKS < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_silent_macros_do_not_evaluate_output() {
        let verbosity = VERBOSITY_SILENT;
        log_changes!(verbosity, "placed task {} on machine {}", 1, 0);
        log_checks!(verbosity, "ready: {:?}", vec![1, 2]);
        log_debug!(verbosity, "label {} -> {}", 3, 4);
    }
}
