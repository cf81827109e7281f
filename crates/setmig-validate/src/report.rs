//! Validation report types

use setmig_settings::{KeyType, Scope, ValueType};

/// A single field divergence between an expected and actual row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Key { expected: String, actual: String },
    KeyType { expected: KeyType, actual: KeyType },
    Value { expected: String, actual: String },
    ValueType { expected: ValueType, actual: ValueType },
}

impl Mismatch {
    /// Human-readable mismatch line naming both values.
    pub fn describe(&self) -> String {
        match self {
            Mismatch::Key { expected, actual } => {
                format!("Key mismatch: {expected} and {actual}")
            }
            Mismatch::KeyType { expected, actual } => {
                format!("Key type mismatch: {expected} and {actual}")
            }
            Mismatch::Value { expected, actual } => {
                format!("Value mismatch: {expected} and {actual}")
            }
            Mismatch::ValueType { expected, actual } => {
                format!("Value type mismatch: {expected} and {actual}")
            }
        }
    }
}

/// Comparison outcome for one aligned row pair.
#[derive(Debug, Clone)]
pub struct RowComparison {
    /// Position in the sorted sequences.
    pub index: usize,
    pub expected_key: String,
    pub actual_key: String,
    pub mismatches: Vec<Mismatch>,
}

impl RowComparison {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Non-fatal warning recorded when the two snapshots differ in size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeWarning {
    pub expected: usize,
    pub actual: usize,
}

/// Full validation outcome for one scope.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub scope: Scope,
    pub size_warning: Option<SizeWarning>,
    pub rows: Vec<RowComparison>,
}

impl ValidationReport {
    /// True when every compared row matched. The size warning alone does not
    /// fail a run.
    pub fn passed(&self) -> bool {
        self.rows.iter().all(RowComparison::passed)
    }

    pub fn failed_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.passed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_describe_names_both_values() {
        let m = Mismatch::Value {
            expected: "1".into(),
            actual: "2".into(),
        };
        assert_eq!(m.describe(), "Value mismatch: 1 and 2");

        let m = Mismatch::KeyType {
            expected: KeyType::Platform,
            actual: KeyType::Custom,
        };
        assert_eq!(m.describe(), "Key type mismatch: platform and custom");
    }

    #[test]
    fn test_report_passed_ignores_size_warning() {
        let report = ValidationReport {
            scope: Scope::System,
            size_warning: Some(SizeWarning {
                expected: 2,
                actual: 1,
            }),
            rows: vec![RowComparison {
                index: 0,
                expected_key: "a".into(),
                actual_key: "a".into(),
                mismatches: Vec::new(),
            }],
        };
        assert!(report.passed());
        assert_eq!(report.failed_rows(), 0);
    }
}
