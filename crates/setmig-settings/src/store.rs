//! Store access and batch import

use crate::{Origin, Scope, Setting, SettingSet, SettingsError};
use std::collections::HashMap;

/// A scoped settings backend.
///
/// Implementations cover the live device provider and the in-memory store
/// used by tests. Permission enforcement is not baked in here; callers that
/// need it wrap a store in [`crate::GuardedStore`].
pub trait SettingsStore {
    /// Authority name, for diagnostics.
    fn authority(&self) -> &str;

    /// Current snapshot of one scope, in store order.
    fn query(&self, scope: Scope) -> Result<SettingSet, SettingsError>;

    /// Insert a single row into one scope.
    fn insert(&mut self, scope: Scope, setting: &Setting) -> Result<(), SettingsError>;
}

/// One failed insert during a batch import.
#[derive(Debug, Clone)]
pub struct ImportFailure {
    pub key: String,
    pub reason: String,
}

/// Outcome of importing one `SettingSet` into a store.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.inserted + self.failures.len()
    }
}

/// Insert every row of `set` into `store`.
///
/// Batch-continue policy: a failed insert is logged and recorded, and the
/// remaining inserts still run. Partial population is still diagnosable by
/// the later validation pass, so a single bad row never aborts the batch.
pub fn import_set(store: &mut dyn SettingsStore, set: &SettingSet) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for setting in set.rows() {
        match store.insert(set.scope(), setting) {
            Ok(()) => summary.inserted += 1,
            Err(e) => {
                tracing::warn!(
                    "Insert failed for {} key '{}' on {}: {}",
                    set.scope(),
                    setting.key,
                    store.authority(),
                    e
                );
                summary.failures.push(ImportFailure {
                    key: setting.key.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Imported {} rows into {} ({} inserted, {} failed)",
        set.scope(),
        store.authority(),
        summary.inserted,
        summary.failed()
    );
    summary
}

/// In-memory settings store for tests and dry runs.
///
/// Rejects duplicate keys within a scope, matching the snapshot invariant.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    authority: String,
    tables: HashMap<Scope, Vec<Setting>>,
}

impl MemoryStore {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            tables: HashMap::new(),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn query(&self, scope: Scope) -> Result<SettingSet, SettingsError> {
        let rows = self.tables.get(&scope).cloned().unwrap_or_default();
        Ok(SettingSet::from_rows(scope, Origin::Migrated, rows))
    }

    fn insert(&mut self, scope: Scope, setting: &Setting) -> Result<(), SettingsError> {
        let table = self.tables.entry(scope).or_default();
        if table.iter().any(|s| s.key == setting.key) {
            return Err(SettingsError::Store(format!(
                "duplicate key '{}' in {}",
                setting.key, scope
            )));
        }
        table.push(setting.clone());
        Ok(())
    }
}
