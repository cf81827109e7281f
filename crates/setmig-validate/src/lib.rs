//! Snapshot validation for setmig
//!
//! Compares a legacy snapshot against a migrated snapshot and produces a
//! [`ValidationReport`]. The library never prints; rendering the report is
//! the caller's job.

mod report;

pub use report::{Mismatch, RowComparison, SizeWarning, ValidationReport};

use setmig_settings::SettingSet;

/// Positional diff of two snapshots of the same scope.
///
/// Both sets are sorted by key, then compared index-by-index over the
/// overlapping prefix. A size difference is recorded as a non-fatal warning;
/// partial migrations are still partially checkable. Every row is compared
/// and every mismatch recorded before returning.
///
/// Known limitation, kept for output compatibility with the original tool:
/// the comparison assumes both sides contain the same key universe once
/// sorted. A key present on only one side shifts every subsequent pair, so
/// callers must ensure no key is missing or extra on one side, or the
/// remaining comparisons silently misalign.
pub fn validate(mut expected: SettingSet, mut actual: SettingSet) -> ValidationReport {
    debug_assert_eq!(expected.scope(), actual.scope());
    let scope = expected.scope();

    expected.sort_by_key();
    actual.sort_by_key();

    let size_warning = if expected.len() != actual.len() {
        tracing::warn!(
            "Size mismatch for {}: legacy {} migrated {}",
            scope,
            expected.len(),
            actual.len()
        );
        Some(SizeWarning {
            expected: expected.len(),
            actual: actual.len(),
        })
    } else {
        None
    };

    let overlap = expected.len().min(actual.len());
    let mut rows = Vec::with_capacity(overlap);

    for (index, (exp, act)) in expected
        .rows()
        .iter()
        .zip(actual.rows().iter())
        .take(overlap)
        .enumerate()
    {
        let mut mismatches = Vec::new();

        if exp.key != act.key {
            mismatches.push(Mismatch::Key {
                expected: exp.key.clone(),
                actual: act.key.clone(),
            });
        }
        if exp.key_type != act.key_type {
            mismatches.push(Mismatch::KeyType {
                expected: exp.key_type,
                actual: act.key_type,
            });
        }
        // An empty expected value means "don't care".
        if !exp.value.is_empty() && exp.value != act.value {
            mismatches.push(Mismatch::Value {
                expected: exp.value.clone(),
                actual: act.value.clone(),
            });
        }
        if exp.value_type != act.value_type {
            mismatches.push(Mismatch::ValueType {
                expected: exp.value_type,
                actual: act.value_type,
            });
        }

        rows.push(RowComparison {
            index,
            expected_key: exp.key.clone(),
            actual_key: act.key.clone(),
            mismatches,
        });
    }

    ValidationReport {
        scope,
        size_warning,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setmig_settings::{KeyType, Origin, Scope, Setting, ValueType};

    fn set(origin: Origin, rows: Vec<Setting>) -> SettingSet {
        SettingSet::from_rows(Scope::System, origin, rows)
    }

    fn row(key: &str, value: &str) -> Setting {
        Setting::new(key, KeyType::Platform, value, ValueType::Int)
    }

    #[test]
    fn test_identical_sets_report_no_mismatches() {
        let rows = vec![row("a", "1"), row("b", "2"), row("c", "3")];
        let report = validate(
            set(Origin::Legacy, rows.clone()),
            set(Origin::Migrated, rows),
        );

        assert!(report.passed());
        assert!(report.size_warning.is_none());
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.failed_rows(), 0);
    }

    #[test]
    fn test_input_order_does_not_affect_output() {
        let expected = vec![row("b", "2"), row("a", "1"), row("c", "3")];
        let actual = vec![row("c", "3"), row("a", "9"), row("b", "2")];

        let first = validate(
            set(Origin::Legacy, expected.clone()),
            set(Origin::Migrated, actual.clone()),
        );

        let mut expected_rev = expected;
        expected_rev.reverse();
        let mut actual_rev = actual;
        actual_rev.reverse();
        let second = validate(
            set(Origin::Legacy, expected_rev),
            set(Origin::Migrated, actual_rev),
        );

        assert_eq!(first.failed_rows(), 1);
        assert_eq!(second.failed_rows(), 1);
        for (a, b) in first.rows.iter().zip(second.rows.iter()) {
            assert_eq!(a.expected_key, b.expected_key);
            assert_eq!(a.mismatches, b.mismatches);
        }
    }

    #[test]
    fn test_value_mismatch_reported_with_both_values() {
        let report = validate(
            set(Origin::Legacy, vec![row("a", "1")]),
            set(Origin::Migrated, vec![row("a", "2")]),
        );

        assert!(!report.passed());
        assert_eq!(
            report.rows[0].mismatches,
            vec![Mismatch::Value {
                expected: "1".into(),
                actual: "2".into(),
            }]
        );
    }

    #[test]
    fn test_empty_expected_value_is_dont_care() {
        let report = validate(
            set(Origin::Legacy, vec![row("a", "")]),
            set(Origin::Migrated, vec![row("a", "anything")]),
        );
        assert!(report.passed());

        // Type mismatches are still reported even with an empty value.
        let expected = Setting::new("a", KeyType::Platform, "", ValueType::Int);
        let actual = Setting::new("a", KeyType::Custom, "anything", ValueType::String);
        let report = validate(
            set(Origin::Legacy, vec![expected]),
            set(Origin::Migrated, vec![actual]),
        );
        assert_eq!(report.rows[0].mismatches.len(), 2);
        assert!(matches!(
            report.rows[0].mismatches[0],
            Mismatch::KeyType { .. }
        ));
        assert!(matches!(
            report.rows[0].mismatches[1],
            Mismatch::ValueType { .. }
        ));
    }

    #[test]
    fn test_size_mismatch_warns_and_compares_prefix() {
        let report = validate(
            set(Origin::Legacy, vec![row("a", "1"), row("b", "2")]),
            set(Origin::Migrated, vec![row("a", "1")]),
        );

        assert_eq!(
            report.size_warning,
            Some(SizeWarning {
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(report.rows.len(), 1);
        assert!(report.passed());
    }

    #[test]
    fn test_all_rows_compared_despite_early_mismatch() {
        let report = validate(
            set(Origin::Legacy, vec![row("a", "1"), row("b", "2"), row("c", "3")]),
            set(Origin::Migrated, vec![row("a", "9"), row("b", "2"), row("c", "8")]),
        );

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.failed_rows(), 2);
        assert!(report.rows[1].passed());
    }

    #[test]
    fn test_differing_key_universe_misaligns_positionally() {
        // Documented limitation: an extra key on one side shifts every
        // subsequent comparison.
        let report = validate(
            set(Origin::Legacy, vec![row("a", "1"), row("c", "3")]),
            set(
                Origin::Migrated,
                vec![row("a", "1"), row("b", "2"), row("c", "3")],
            ),
        );

        assert!(report.size_warning.is_some());
        assert_eq!(report.rows.len(), 2);
        assert!(report.rows[0].passed());
        // Position 1 compares legacy "c" against migrated "b".
        assert!(!report.rows[1].passed());
        assert!(matches!(
            report.rows[1].mismatches[0],
            Mismatch::Key { .. }
        ));
    }
}
