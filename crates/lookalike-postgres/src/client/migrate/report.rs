use std::time::Duration;

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Versions applied by this run, in order.
    pub applied_versions: Vec<String>,
    /// Wall time of the run.
    pub duration: Duration,
}

impl MigrationResult {
    /// Creates a migration result.
    pub fn new(duration: Duration, applied_versions: Vec<String>) -> Self {
        Self {
            applied_versions,
            duration,
        }
    }

    /// Returns true if nothing needed to be applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.applied_versions.is_empty()
    }

    /// Number of migrations applied by this run.
    #[inline]
    pub fn applied_count(&self) -> usize {
        self.applied_versions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_up_to_date() {
        let result = MigrationResult::new(Duration::from_millis(3), vec![]);
        assert!(result.is_up_to_date());

        let result = MigrationResult::new(
            Duration::from_millis(40),
            vec!["20250601000000".to_string()],
        );
        assert!(!result.is_up_to_date());
        assert_eq!(result.applied_count(), 1);
    }
}
