//! Exit code logic for search runs.
//!
//! Single responsibility: map result and failure counts to the process exit outcome.

use crate::ProcessExit;

/// A run fails only when nothing was found and every selected source hit a
/// real error. Stub sources never count as failures.
pub(crate) fn determine_exit_outcome(
    jobs_found: usize,
    failed_sources: usize,
    selected_sources: usize,
) -> ProcessExit {
    if jobs_found == 0 && selected_sources > 0 && failed_sources >= selected_sources {
        ProcessExit::Failure
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
mod tests {
    use super::determine_exit_outcome;
    use crate::ProcessExit;

    #[test]
    fn test_exit_outcome_success_when_no_failures() {
        assert_eq!(determine_exit_outcome(3, 0, 2), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_when_nothing_found_without_errors() {
        assert_eq!(determine_exit_outcome(0, 0, 3), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_when_some_sources_failed() {
        assert_eq!(determine_exit_outcome(0, 1, 2), ProcessExit::Success);
        assert_eq!(determine_exit_outcome(4, 2, 2), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_failure_when_all_failed() {
        assert_eq!(determine_exit_outcome(0, 2, 2), ProcessExit::Failure);
    }
}
