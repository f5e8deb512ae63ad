use std::fs;
use std::path::{Path, PathBuf};

use kompo_core::composite::CompositeBuild;
use kompo_core::coordinate::Coordinate;
use kompo_util::errors::KompoError;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures/solverslib")
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_explicit_substitution_from_fixture() {
    let build = CompositeBuild::load(&fixtures_dir().join("pedroPathing/Kompo.toml")).unwrap();
    assert_eq!(build.included.len(), 1);
    assert_eq!(build.included[0].name, "core");
    assert_eq!(build.rules.len(), 1);

    let core = Coordinate::parse("org.solverslib:core:1.0.0").unwrap();
    let project = build.rules.lookup(&core).unwrap();
    assert_eq!(project.build_path(), ":core");
    assert!(project.dir.ends_with("core"));
    assert_eq!(build.local_version(project).unwrap().as_deref(), Some("1.0.0"));

    let pedro = Coordinate::parse("org.solverslib:pedroPathing:1.0.0").unwrap();
    assert!(build.rules.lookup(&pedro).is_none());
}

#[test]
fn test_implicit_substitution_uses_published_coordinates() {
    let build = CompositeBuild::load(&fixtures_dir().join("examples/Kompo.toml")).unwrap();
    let modules: Vec<String> = build.rules.iter().map(|r| r.module.to_string()).collect();
    assert_eq!(modules, ["org.solverslib:core", "org.solverslib:pedroPathing"]);
}

#[test]
fn test_duplicate_substitution_fails_at_load() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "core/Kompo.toml", "[project]\nname = \"core\"\n");
    write(tmp.path(), "core-fork/Kompo.toml", "[project]\nname = \"core\"\n");
    write(
        tmp.path(),
        "app/Kompo.toml",
        r#"
[project]
name = "app"

[[include-build]]
path = "../core"
substitute = [{ module = "org.solverslib:core", project = ":" }]

[[include-build]]
path = "../core-fork"
substitute = [{ module = "org.solverslib:core" }]
"#,
    );

    let err = CompositeBuild::load(&tmp.path().join("app/Kompo.toml")).unwrap_err();
    match err.downcast_ref::<KompoError>() {
        Some(KompoError::DuplicateCoordinate {
            coordinate,
            first,
            second,
        }) => {
            assert_eq!(coordinate, "org.solverslib:core");
            assert_eq!(first, ":core");
            assert_eq!(second, ":core-fork");
        }
        other => panic!("expected DuplicateCoordinate, got {other:?}"),
    }
}

#[test]
fn test_missing_included_build_dir() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "Kompo.toml",
        "[project]\nname = \"app\"\n\n[[include-build]]\npath = \"../nowhere\"\n",
    );
    let err = CompositeBuild::load(&tmp.path().join("Kompo.toml")).unwrap_err();
    assert!(err.to_string().contains("does not exist"), "got: {err}");
}

#[test]
fn test_subproject_substitution_path() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "lib/drivebase/Kompo.toml",
        "[project]\nname = \"drivebase\"\nversion = \"0.3.0\"\n",
    );
    write(
        tmp.path(),
        "app/Kompo.toml",
        r#"
[project]
name = "app"

[[include-build]]
path = "../lib"
name = "solvers"
substitute = [{ module = "org.solverslib:drivebase", project = ":drivebase" }]
"#,
    );
    let build = CompositeBuild::load(&tmp.path().join("app/Kompo.toml")).unwrap();
    let coord = Coordinate::parse("org.solverslib:drivebase").unwrap();
    let project = build.rules.lookup(&coord).unwrap();
    assert_eq!(project.build_path(), ":solvers:drivebase");
    assert!(project.dir.ends_with("lib/drivebase"));
    assert_eq!(build.local_version(project).unwrap().as_deref(), Some("0.3.0"));
}

#[test]
fn test_include_without_manifest_or_rules_contributes_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("scratch")).unwrap();
    write(
        tmp.path(),
        "Kompo.toml",
        "[project]\nname = \"app\"\n\n[[include-build]]\npath = \"scratch\"\n",
    );
    let build = CompositeBuild::load(&tmp.path().join("Kompo.toml")).unwrap();
    assert_eq!(build.included.len(), 1);
    assert!(build.rules.is_empty());
}

#[test]
fn test_bad_project_path_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("core")).unwrap();
    write(
        tmp.path(),
        "Kompo.toml",
        r#"
[project]
name = "app"

[[include-build]]
path = "core"
substitute = [{ module = "org.solverslib:core", project = "core" }]
"#,
    );
    let err = CompositeBuild::load(&tmp.path().join("Kompo.toml")).unwrap_err();
    assert!(err.to_string().contains("must start with ':'"), "got: {err}");
}
