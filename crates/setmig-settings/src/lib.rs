//! Settings data model and store access for setmig
//!
//! Defines the row types shared by every stage of a migration run: a
//! [`Setting`] is one key/value row, a [`SettingSet`] is one scope's snapshot,
//! and [`SettingsStore`] is the seam behind which the legacy and migrated
//! backends live. Snapshots are in-memory only and handed off by value between
//! stages; nothing here persists beyond the stores themselves.

mod export;
mod guard;
mod store;

pub use export::read_scope;
pub use guard::{Capability, Credential, GuardedStore};
pub use store::{ImportFailure, ImportSummary, MemoryStore, SettingsStore, import_set};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings source not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Permission denied: {0} capability required")]
    PermissionDenied(Capability),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A settings namespace with independent key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    System,
    Secure,
    Global,
}

impl Scope {
    /// All scopes, in the order a migration run processes them.
    pub const ALL: [Scope; 3] = [Scope::System, Scope::Secure, Scope::Global];

    /// Token used in export files and provider URIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::System => "system",
            Scope::Secure => "secure",
            Scope::Global => "global",
        }
    }

    /// Parse an export-file token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "system" => Some(Scope::System),
            "secure" => Some(Scope::Secure),
            "global" => Some(Scope::Global),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a setting key: defined by the platform, or added by a
/// vendor/user overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Platform,
    Custom,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Platform => "platform",
            KeyType::Custom => "custom",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "platform" => Some(KeyType::Platform),
            "custom" => Some(KeyType::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intended type of a setting's value. Values are always stored as text; the
/// tag records how the payload should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Long,
    Float,
    String,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::String => "string",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "int" => Some(ValueType::Int),
            "long" => Some(ValueType::Long),
            "float" => Some(ValueType::Float),
            "string" => Some(ValueType::String),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration row.
///
/// Ordered by `key` (lexicographic) so that two independently-fetched
/// snapshots can be aligned for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub key_type: KeyType,
    /// String-encoded payload; numeric values are stored as text.
    pub value: String,
    pub value_type: ValueType,
}

impl Setting {
    pub fn new(
        key: impl Into<String>,
        key_type: KeyType,
        value: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            key: key.into(),
            key_type,
            value: value.into(),
            value_type,
        }
    }
}

impl PartialOrd for Setting {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Setting {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Which store a snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Legacy,
    Migrated,
}

/// An ordered sequence of settings for one scope, tagged by origin.
///
/// Invariant: keys are unique within one snapshot.
#[derive(Debug, Clone)]
pub struct SettingSet {
    scope: Scope,
    origin: Origin,
    rows: Vec<Setting>,
}

impl SettingSet {
    pub fn new(scope: Scope, origin: Origin) -> Self {
        Self {
            scope,
            origin,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(scope: Scope, origin: Origin, rows: Vec<Setting>) -> Self {
        Self { scope, origin, rows }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Setting] {
        &self.rows
    }

    pub fn push(&mut self, setting: Setting) {
        self.rows.push(setting);
    }

    /// Stable lexicographic sort by key.
    pub fn sort_by_key(&mut self) {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
    }

    pub fn into_rows(self) -> Vec<Setting> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Setting> {
        self.rows.iter()
    }
}

impl IntoIterator for SettingSet {
    type Item = Setting;
    type IntoIter = std::vec::IntoIter<Setting>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
