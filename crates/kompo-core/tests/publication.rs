use std::path::Path;

use kompo_core::manifest::Manifest;
use kompo_core::publication::{ArtifactKind, PublicationDescriptor};

const PEDRO: &str = r#"
[project]
name = "pedroPathing"
group = "org.solverslib"
version = "2.1.1"

[publication]
group-id = "org.solverslib"
artifact-id = "pedroPathing"
packaging = "aar"
docs = ["dokka-html", "dokka-javadoc"]
"#;

#[test]
fn compose_release_with_doc_jars() {
    let manifest = Manifest::parse_toml(PEDRO).unwrap();
    let desc = PublicationDescriptor::compose(&manifest, Path::new("/work/pedroPathing")).unwrap();
    assert_eq!(desc.name, "release");
    assert_eq!(desc.group_id, "org.solverslib");
    assert_eq!(desc.artifact_id, "pedroPathing");
    assert_eq!(desc.version, "2.1.1");

    let kinds: Vec<ArtifactKind> = desc.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        [ArtifactKind::Binary, ArtifactKind::ReferenceDocs, ArtifactKind::ApiDocs]
    );
    assert_eq!(
        desc.artifacts[0].file,
        Path::new("/work/pedroPathing/build/outputs/pedroPathing.aar")
    );
    assert_eq!(desc.repository_file_name(&desc.artifacts[0]), "pedroPathing-2.1.1.aar");
    assert_eq!(
        desc.repository_file_name(&desc.artifacts[1]),
        "pedroPathing-2.1.1-html-docs.jar"
    );
    assert_eq!(
        desc.repository_file_name(&desc.artifacts[2]),
        "pedroPathing-2.1.1-javadoc.jar"
    );
    assert_eq!(desc.pom_file_name(), "pedroPathing-2.1.1.pom");
}

#[test]
fn compose_respects_file_overrides_and_sources() {
    let manifest = Manifest::parse_toml(
        r#"
[project]
name = "core"
group = "org.solverslib"
version = "1.0.0-SNAPSHOT"

[publication]
sources = true

[publication.files]
binary = "out/core-release.jar"
"#,
    )
    .unwrap();
    let desc = PublicationDescriptor::compose(&manifest, Path::new("/w")).unwrap();
    assert_eq!(desc.artifact_id, "core");
    assert!(desc.is_snapshot());
    assert_eq!(desc.artifacts[0].file, Path::new("/w/out/core-release.jar"));
    assert_eq!(desc.artifacts[1].kind, ArtifactKind::Sources);
    assert_eq!(desc.artifacts[1].classifier.as_deref(), Some("sources"));
}

#[test]
fn compose_requires_version() {
    let manifest = Manifest::parse_toml(
        "[project]\nname = \"core\"\ngroup = \"org.solverslib\"\n\n[publication]\n",
    )
    .unwrap();
    let err = PublicationDescriptor::compose(&manifest, Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("version"), "got: {err}");
}

#[test]
fn compose_requires_publication_section() {
    let manifest = Manifest::parse_toml("[project]\nname = \"core\"\n").unwrap();
    assert!(PublicationDescriptor::compose(&manifest, Path::new(".")).is_err());
}

#[test]
fn compose_rejects_unknown_doc_jar() {
    let manifest = Manifest::parse_toml(
        r#"
[project]
name = "core"
group = "g"
version = "1"

[publication]
docs = ["asciidoc"]
"#,
    )
    .unwrap();
    let err = PublicationDescriptor::compose(&manifest, Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("asciidoc"), "got: {err}");
}

#[test]
fn missing_files_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    let manifest = Manifest::parse_toml(PEDRO).unwrap();
    let desc = PublicationDescriptor::compose(&manifest, tmp.path()).unwrap();
    assert_eq!(desc.missing_files().len(), 3);

    std::fs::create_dir_all(tmp.path().join("build/outputs")).unwrap();
    std::fs::write(tmp.path().join("build/outputs/pedroPathing.aar"), b"aar").unwrap();
    assert_eq!(desc.missing_files().len(), 2);
}

const PEDRO_FROM_GIT: &str = r#"
[project]
name = "pedroPathing"

[publication]
group-id = "org.solverslib"
artifact-id = "pedroPathing"
packaging = "aar"
git-dir = ".."
"#;

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_AUTHOR_NAME", "kompo")
        .env("GIT_AUTHOR_EMAIL", "kompo@example.com")
        .env("GIT_COMMITTER_NAME", "kompo")
        .env("GIT_COMMITTER_EMAIL", "kompo@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?}");
}

/// A repository with one commit tagged `tag`; returns the project directory.
fn tagged_repo(root: &Path, tag: &str) -> std::path::PathBuf {
    let project = root.join("pedroPathing");
    std::fs::create_dir_all(&project).unwrap();
    git(root, &["init", "--quiet"]);
    git(root, &["commit", "--quiet", "--allow-empty", "-m", "release"]);
    git(root, &["tag", tag]);
    project
}

#[test]
fn compose_takes_version_from_git_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tagged_repo(tmp.path(), "v2.1.1");
    let manifest = Manifest::parse_toml(PEDRO_FROM_GIT).unwrap();

    let desc = PublicationDescriptor::compose(&manifest, &project).unwrap();
    assert_eq!(desc.version, "2.1.1");
    assert_eq!(desc.pom_file_name(), "pedroPathing-2.1.1.pom");
}

#[test]
fn commits_past_the_tag_publish_a_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tagged_repo(tmp.path(), "2.1.1");
    git(tmp.path(), &["commit", "--quiet", "--allow-empty", "-m", "wip"]);
    let manifest = Manifest::parse_toml(PEDRO_FROM_GIT).unwrap();

    let desc = PublicationDescriptor::compose(&manifest, &project).unwrap();
    assert_eq!(desc.version, "2.1.1-SNAPSHOT");
    assert!(desc.is_snapshot());
}

#[test]
fn explicit_version_wins_over_git_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tagged_repo(tmp.path(), "v2.1.1");
    let manifest =
        Manifest::parse_toml(&PEDRO_FROM_GIT.replace("git-dir", "version = \"3.0.0\"\ngit-dir"))
            .unwrap();

    let desc = PublicationDescriptor::compose(&manifest, &project).unwrap();
    assert_eq!(desc.version, "3.0.0");
}

#[test]
fn untagged_repository_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tmp.path().join("pedroPathing");
    std::fs::create_dir_all(&project).unwrap();
    git(tmp.path(), &["init", "--quiet"]);
    git(tmp.path(), &["commit", "--quiet", "--allow-empty", "-m", "initial"]);
    let manifest = Manifest::parse_toml(PEDRO_FROM_GIT).unwrap();

    let err = PublicationDescriptor::compose(&manifest, &project).unwrap_err();
    assert!(err.to_string().contains("no release tag"), "got: {err}");
}
