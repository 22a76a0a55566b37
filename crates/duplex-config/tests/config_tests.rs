//! Configuration loading and profile conversion tests.

use duplex_config::{ConfigError, DuplexConfig};
use duplex_profile::{ModuleFallback, PackagingMode, SourceMapMode, TargetKind};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FULL: &str = r#"
[shared]
entry = "src/main.ts"

[browser]
out_dir = "out/web"
filename = "pkg.min.js"
library = "MyPackage"

[browser.fallback]
path = { polyfill = "polyfills/path.ts" }
crypto = { polyfill = "polyfills/crypto.ts" }
fs = "off"

[host]
out_dir = "out/gas"
filename = "Code.gs"
reserved = ["doGet", "onOpen"]
globals = ["SpreadsheetApp", "UrlFetchApp"]
"#;

#[test]
fn parses_full_config() {
    let config = DuplexConfig::from_str(FULL).unwrap();
    assert_eq!(config.shared.entry, PathBuf::from("src/main.ts"));
    assert_eq!(config.browser.library, "MyPackage");
    assert_eq!(config.browser.fallback.len(), 3);
    assert_eq!(config.host.reserved, vec!["doGet", "onOpen"]);
    config.validate().unwrap();
}

#[test]
fn defaults_fill_missing_sections() {
    let config = DuplexConfig::from_str("[shared]\nentry = \"src/main.ts\"\n").unwrap();
    assert_eq!(config.browser.out_dir, PathBuf::from("dist/browser"));
    assert_eq!(config.browser.filename, "bundle.min.js");
    assert_eq!(config.host.filename, "main.gs");
    // The default reserved set is the original host callback surface.
    assert!(config.host.reserved.iter().any(|n| n == "doGet"));
    assert!(config.host.reserved.iter().any(|n| n == "onSelectionChange"));
}

#[test]
fn browser_profile_carries_the_fallback_table() {
    let config = DuplexConfig::from_str(FULL).unwrap();
    let profile = config.browser_profile().unwrap();

    assert_eq!(profile.kind, TargetKind::Browser);
    assert_eq!(profile.filename, "pkg.min.js");
    assert_eq!(profile.library_name(), Some("MyPackage"));
    assert_eq!(profile.source_map, SourceMapMode::External);
    assert_eq!(
        profile.fallbacks.get("path"),
        Some(&ModuleFallback::Polyfill("polyfills/path.ts".into()))
    );
    assert_eq!(profile.fallbacks.get("fs"), Some(&ModuleFallback::Disabled));
}

#[test]
fn host_profile_has_an_empty_resolver() {
    let config = DuplexConfig::from_str(FULL).unwrap();
    let profile = config.host_profile().unwrap();

    assert_eq!(profile.kind, TargetKind::HostScript);
    assert_eq!(profile.packaging, PackagingMode::BareGlobal);
    assert_eq!(profile.source_map, SourceMapMode::Inline);
    assert!(profile.fallbacks.is_empty());
    assert!(profile.minify.reserved.contains("doGet"));
    assert!(!profile.minify.reserved.contains("doPost"));
    assert_eq!(
        profile.ambient_globals,
        vec!["SpreadsheetApp".to_string(), "UrlFetchApp".to_string()]
    );
}

#[test]
fn unknown_fallback_flag_is_rejected() {
    let config = DuplexConfig::from_str(
        "[shared]\nentry = \"src/main.ts\"\n[browser.fallback]\npath = \"maybe\"\n",
    )
    .unwrap();
    let err = config.browser_profile().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));
}

#[test]
fn load_reads_duplex_toml_from_cwd() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("duplex.toml"), FULL).unwrap();

    let config = DuplexConfig::load(None, dir.path()).unwrap();
    assert_eq!(config.browser.library, "MyPackage");
}

#[test]
fn load_reports_missing_config() {
    let dir = TempDir::new().unwrap();
    let err = DuplexConfig::load(None, dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn validate_paths_requires_the_entry_file() {
    let dir = TempDir::new().unwrap();
    let config = DuplexConfig::from_str("[shared]\nentry = \"src/main.ts\"\n").unwrap();

    assert!(matches!(
        config.validate_paths(dir.path()),
        Err(ConfigError::EntryNotFound(_))
    ));

    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.ts"), "export {};\n").unwrap();
    assert!(config.validate_paths(dir.path()).is_ok());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = DuplexConfig::from_str("[shared\nentry = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
