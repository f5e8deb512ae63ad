use std::fs;
use tempfile::TempDir;

use kompo_core::manifest::Manifest;

#[test]
fn test_from_path_resolves_env_references() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("Kompo.toml"),
        r#"
[project]
name = "pedroPathing"
group = "org.solverslib"
version = "${env:RELEASE_VERSION}"
"#,
    )
    .unwrap();
    fs::write(tmp.path().join(".kompo.env"), "RELEASE_VERSION=2.1.1\n").unwrap();

    let manifest = Manifest::from_path(&tmp.path().join("Kompo.toml")).unwrap();
    assert_eq!(manifest.project.version.as_deref(), Some("2.1.1"));
    assert_eq!(manifest.published_version(), Some("2.1.1"));
}

#[test]
fn test_unresolved_version_counts_as_missing() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("Kompo.toml"),
        r#"
[project]
name = "core"
version = "${env:KOMPO_TEST_DEFINITELY_UNSET}"
"#,
    )
    .unwrap();

    let manifest = Manifest::from_path(&tmp.path().join("Kompo.toml")).unwrap();
    assert_eq!(manifest.published_version(), None);
}

#[test]
fn test_from_path_missing_file_is_manifest_error() {
    let tmp = TempDir::new().unwrap();
    let err = Manifest::from_path(&tmp.path().join("Kompo.toml")).unwrap_err();
    assert!(err.to_string().contains("Manifest error"), "got: {err}");
}
