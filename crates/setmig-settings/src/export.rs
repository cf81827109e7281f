//! Export file parsing
//!
//! Legacy settings exports are line-oriented text, one row per line:
//!
//! ```text
//! <scope>|<key_type>|<key>|<value>|<value_type>
//! ```
//!
//! `#`-prefixed lines and blank lines are skipped. The value field may be
//! empty. Values cannot contain the `|` separator.

use crate::{KeyType, Origin, Scope, Setting, SettingSet, SettingsError, ValueType};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Read all rows for one scope from an export file, in file order.
///
/// All-or-nothing: a malformed line anywhere in the file fails the read,
/// even if the line belongs to a different scope. A missing or unreadable
/// file is reported as `NotFound`.
pub fn read_scope(path: &Path, scope: Scope) -> Result<SettingSet, SettingsError> {
    let contents =
        fs::read_to_string(path).map_err(|_| SettingsError::NotFound(path.to_path_buf()))?;

    let set = parse_export(&contents, scope)?;
    tracing::debug!(
        "Read {} {} rows from {}",
        set.len(),
        scope,
        path.display()
    );
    Ok(set)
}

fn parse_export(text: &str, scope: Scope) -> Result<SettingSet, SettingsError> {
    let mut set = SettingSet::new(scope, Origin::Legacy);
    let mut seen_keys: HashSet<String> = HashSet::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = parse_line(line).map_err(|reason| SettingsError::Parse {
            line: idx + 1,
            reason,
        })?;

        let (row_scope, setting) = row;
        if row_scope != scope {
            continue;
        }

        if !seen_keys.insert(setting.key.clone()) {
            return Err(SettingsError::Parse {
                line: idx + 1,
                reason: format!("duplicate key '{}' in scope {}", setting.key, scope),
            });
        }

        set.push(setting);
    }

    Ok(set)
}

fn parse_line(line: &str) -> Result<(Scope, Setting), String> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 5 {
        return Err(format!("expected 5 fields, found {}", fields.len()));
    }

    let scope = Scope::from_token(fields[0])
        .ok_or_else(|| format!("unknown scope '{}'", fields[0]))?;
    let key_type = KeyType::from_token(fields[1])
        .ok_or_else(|| format!("unknown key type '{}'", fields[1]))?;

    let key = fields[2];
    if key.is_empty() {
        return Err("empty key".to_string());
    }

    let value = fields[3];
    let value_type = ValueType::from_token(fields[4])
        .ok_or_else(|| format!("unknown value type '{}'", fields[4]))?;

    Ok((scope, Setting::new(key, key_type, value, value_type)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# host settings export
system|platform|screen_brightness|180|int

system|custom|vendor_boot_anim|1|int
secure|platform|adb_enabled|1|int
global|platform|airplane_mode_on||int
";

    #[test]
    fn test_parse_filters_by_scope() {
        let set = parse_export(SAMPLE, Scope::System).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.rows()[0].key, "screen_brightness");
        assert_eq!(set.rows()[1].key_type, KeyType::Custom);

        let secure = parse_export(SAMPLE, Scope::Secure).unwrap();
        assert_eq!(secure.len(), 1);
        assert_eq!(secure.scope(), Scope::Secure);
        assert_eq!(secure.origin(), Origin::Legacy);
    }

    #[test]
    fn test_parse_allows_empty_value() {
        let set = parse_export(SAMPLE, Scope::Global).unwrap();
        assert_eq!(set.rows()[0].value, "");
        assert_eq!(set.rows()[0].value_type, ValueType::Int);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = parse_export("system|platform|key|1", Scope::System).unwrap_err();
        match err {
            SettingsError::Parse { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("5 fields"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        assert!(parse_export("kernel|platform|k|1|int", Scope::System).is_err());
        assert!(parse_export("system|magic|k|1|int", Scope::System).is_err());
        assert!(parse_export("system|platform|k|1|blob", Scope::System).is_err());
        assert!(parse_export("system|platform||1|int", Scope::System).is_err());
    }

    #[test]
    fn test_parse_is_all_or_nothing_across_scopes() {
        // Malformed secure row fails a system read too.
        let text = "system|platform|k|1|int\nsecure|broken";
        assert!(parse_export(text, Scope::System).is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_key_in_scope() {
        let text = "system|platform|k|1|int\nsystem|platform|k|2|int";
        let err = parse_export(text, Scope::System).unwrap_err();
        match err {
            SettingsError::Parse { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("duplicate key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Same key in a different scope is fine.
        let text = "system|platform|k|1|int\nsecure|platform|k|2|int";
        assert!(parse_export(text, Scope::System).is_ok());
    }

    #[test]
    fn test_read_scope_missing_file() {
        let err = read_scope(Path::new("/nonexistent/export.txt"), Scope::System).unwrap_err();
        assert!(matches!(err, SettingsError::NotFound(_)));
    }
}
