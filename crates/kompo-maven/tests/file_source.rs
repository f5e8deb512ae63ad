use std::fs;
use std::path::Path;

use kompo_core::coordinate::ModuleId;
use kompo_maven::repository::MavenRepository;
use kompo_maven::source::{open_source, ArtifactSource, FileRepository};

fn pom(root: &Path, group_path: &str, artifact: &str, version: &str) {
    let dir = root.join(group_path).join(artifact).join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{artifact}-{version}.pom")), "<project/>").unwrap();
}

fn file_repo(root: &Path) -> FileRepository {
    FileRepository::new(MavenRepository::directory("staging", root), root.to_path_buf())
}

#[tokio::test]
async fn has_version_checks_pom_or_module_file() {
    let tmp = tempfile::tempdir().unwrap();
    pom(tmp.path(), "com/pedropathing", "ftc", "2.0.4");
    let dir = tmp.path().join("org/ejml/ejml-simple/0.39");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("ejml-simple-0.39.module"), "{}").unwrap();

    let repo = file_repo(tmp.path());
    let ftc = ModuleId::new("com.pedropathing", "ftc");
    assert!(repo.has_version(&ftc, "2.0.4").await.unwrap());
    assert!(!repo.has_version(&ftc, "2.0.5").await.unwrap());
    assert!(repo
        .has_version(&ModuleId::new("org.ejml", "ejml-simple"), "0.39")
        .await
        .unwrap());
}

#[tokio::test]
async fn list_versions_reads_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("org/solverslib/core");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("maven-metadata.xml"),
        r#"<metadata><groupId>org.solverslib</groupId><artifactId>core</artifactId>
<versioning><release>1.1.0</release><versions><version>1.0.0</version><version>1.1.0</version></versions></versioning></metadata>"#,
    )
    .unwrap();

    let repo = file_repo(tmp.path());
    let versions = repo
        .list_versions(&ModuleId::new("org.solverslib", "core"))
        .await
        .unwrap();
    assert_eq!(versions, ["1.0.0", "1.1.0"]);
}

#[tokio::test]
async fn list_versions_scans_directories_without_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    pom(tmp.path(), "com/pedropathing", "ftc", "2.0.4");
    pom(tmp.path(), "com/pedropathing", "ftc", "2.0.1");
    fs::create_dir_all(tmp.path().join("com/pedropathing/ftc/empty")).unwrap();

    let repo = file_repo(tmp.path());
    let versions = repo
        .list_versions(&ModuleId::new("com.pedropathing", "ftc"))
        .await
        .unwrap();
    assert_eq!(versions, ["2.0.1", "2.0.4"]);
}

#[tokio::test]
async fn unknown_module_lists_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = file_repo(tmp.path());
    assert!(repo
        .list_versions(&ModuleId::new("org.solverslib", "pedroPathing"))
        .await
        .unwrap()
        .is_empty());
}

#[test]
fn open_source_picks_file_repository_for_file_urls() {
    let tmp = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();
    let local = open_source(MavenRepository::directory("staging", tmp.path()), &client);
    assert!(!local.is_remote());
    assert_eq!(
        local.describe(),
        format!("staging (file://{})", tmp.path().display())
    );

    let remote = open_source(MavenRepository::new("brott", "https://maven.brott.dev/"), &client);
    assert!(remote.is_remote());
    assert_eq!(remote.describe(), "brott (https://maven.brott.dev)");
}
