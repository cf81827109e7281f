//! Settings store over the device content provider
//!
//! Drives `adb shell content query/insert` against a provider authority. The
//! legacy and migrated stores are both this type, constructed with their
//! respective authorities.

use crate::{Adb, CommandRunner, DeviceError};
use regex::Regex;
use setmig_settings::{
    KeyType, Origin, Scope, Setting, SettingSet, SettingsError, SettingsStore, ValueType,
};
use std::sync::OnceLock;

fn row_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Row: \d+ (.*)$").unwrap())
}

/// Content-provider-backed [`SettingsStore`] reachable over adb.
#[derive(Debug, Clone)]
pub struct ProviderStore<R> {
    adb: Adb<R>,
    authority: String,
}

impl<R: CommandRunner> ProviderStore<R> {
    pub fn new(adb: Adb<R>, authority: impl Into<String>) -> Self {
        Self {
            adb,
            authority: authority.into(),
        }
    }

    fn uri(&self, scope: Scope) -> String {
        format!("content://{}/{}", self.authority, scope)
    }
}

impl<R: CommandRunner> SettingsStore for ProviderStore<R> {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn query(&self, scope: Scope) -> Result<SettingSet, SettingsError> {
        let uri = self.uri(scope);
        let output = self
            .adb
            .shell(&["content", "query", "--uri", &uri])
            .map_err(|e| SettingsError::Store(e.to_string()))?;

        let rows = parse_query_rows(&output.stdout)
            .map_err(|e| SettingsError::Store(e.to_string()))?;

        tracing::debug!("Queried {} rows from {}", rows.len(), uri);
        Ok(SettingSet::from_rows(scope, Origin::Migrated, rows))
    }

    fn insert(&mut self, scope: Scope, setting: &Setting) -> Result<(), SettingsError> {
        let uri = self.uri(scope);
        let binds = [
            format!("name:s:{}", setting.key),
            format!("key_type:s:{}", setting.key_type),
            format!("value:s:{}", setting.value),
            format!("value_type:s:{}", setting.value_type),
        ];

        let mut args: Vec<&str> = vec!["content", "insert", "--uri", &uri];
        for bind in &binds {
            args.push("--bind");
            args.push(bind);
        }

        self.adb
            .shell(&args)
            .map_err(|e| SettingsError::Store(e.to_string()))?;
        Ok(())
    }
}

/// Parse `content query` output lines into settings.
///
/// Each row prints as `Row: N name=..., key_type=..., value=..., value_type=...`.
/// Field splitting relies on the `", "` delimiter the content tool emits, so
/// values must not themselves contain `", "`.
fn parse_query_rows(stdout: &str) -> Result<Vec<Setting>, DeviceError> {
    let mut rows = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        let captures = match row_pattern().captures(line) {
            Some(c) => c,
            None => continue,
        };

        let mut key = None;
        let mut key_type = None;
        let mut value = None;
        let mut value_type = None;

        for field in captures[1].split(", ") {
            let (name, raw) = field
                .split_once('=')
                .ok_or_else(|| DeviceError::MalformedRow(line.to_string()))?;
            // The content tool prints NULL for absent values.
            let raw = if raw == "NULL" { "" } else { raw };
            match name {
                "name" => key = Some(raw.to_string()),
                "key_type" => key_type = KeyType::from_token(raw),
                "value" => value = Some(raw.to_string()),
                "value_type" => value_type = ValueType::from_token(raw),
                _ => {}
            }
        }

        match (key, key_type, value, value_type) {
            (Some(key), Some(key_type), Some(value), Some(value_type)) => {
                rows.push(Setting::new(key, key_type, value, value_type));
            }
            _ => return Err(DeviceError::MalformedRow(line.to_string())),
        }
    }

    Ok(rows)
}
