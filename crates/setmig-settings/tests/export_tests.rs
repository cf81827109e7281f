//! Integration tests for export file reading

use setmig_settings::{KeyType, Scope, SettingsError, ValueType, read_scope};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment holding a settings export on disk
struct ExportTestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    export_dir: PathBuf,
}

impl ExportTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let export_dir = temp_dir.path().join("exports");
        fs::create_dir_all(&export_dir).expect("Failed to create export directory");

        Self {
            temp_dir,
            export_dir,
        }
    }

    fn write_export(&self, name: &str, content: &str) -> PathBuf {
        let path = self.export_dir.join(name);
        fs::write(&path, content).expect("Failed to write export");
        path
    }
}

#[test]
fn test_read_all_scopes_from_one_file() {
    let env = ExportTestEnv::new();
    let path = env.write_export(
        "legacy.settings",
        "\
# exported from device 2024-11-02
system|platform|screen_brightness|180|int
system|platform|font_scale|1.15|float
secure|custom|vendor_fingerprint_wake|1|int
global|platform|airplane_mode_on|0|int
global|platform|boot_count|42|long
",
    );

    let system = read_scope(&path, Scope::System).unwrap();
    let secure = read_scope(&path, Scope::Secure).unwrap();
    let global = read_scope(&path, Scope::Global).unwrap();

    assert_eq!(system.len(), 2);
    assert_eq!(secure.len(), 1);
    assert_eq!(global.len(), 2);

    assert_eq!(system.rows()[1].value_type, ValueType::Float);
    assert_eq!(secure.rows()[0].key_type, KeyType::Custom);
    assert_eq!(global.rows()[1].value, "42");

    // File order is preserved, not sorted.
    assert_eq!(system.rows()[0].key, "screen_brightness");
    assert_eq!(system.rows()[1].key, "font_scale");
}

#[test]
fn test_malformed_row_fails_whole_read() {
    let env = ExportTestEnv::new();
    let path = env.write_export(
        "broken.settings",
        "system|platform|good_key|1|int\nsystem|platform|bad_key|1\n",
    );

    let err = read_scope(&path, Scope::System).unwrap_err();
    match err {
        SettingsError::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_file_is_not_found() {
    let env = ExportTestEnv::new();
    let path = env.export_dir.join("absent.settings");

    let err = read_scope(&path, Scope::Global).unwrap_err();
    assert!(matches!(err, SettingsError::NotFound(_)));
}

#[test]
fn test_empty_file_yields_empty_set() {
    let env = ExportTestEnv::new();
    let path = env.write_export("empty.settings", "\n# nothing here\n\n");

    let set = read_scope(&path, Scope::System).unwrap();
    assert!(set.is_empty());
}
