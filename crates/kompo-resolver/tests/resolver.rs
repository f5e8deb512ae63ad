use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use kompo_core::coordinate::{Coordinate, ModuleId};
use kompo_core::substitution::{LocalProject, SubstitutionRule, SubstitutionRules};
use kompo_maven::checksum;
use kompo_maven::repository::MavenRepository;
use kompo_maven::source::{ArtifactSource, FileRepository};
use kompo_resolver::resolver::{CoordinateResolver, Resolvable};
use kompo_util::errors::KompoError;

/// A repository held in memory: module -> listed versions.
struct MemoryRepo {
    name: String,
    url: String,
    remote: bool,
    fail: bool,
    modules: HashMap<ModuleId, Vec<String>>,
    queries: Arc<AtomicUsize>,
}

impl MemoryRepo {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("https://{name}.example/maven"),
            remote: true,
            fail: false,
            modules: HashMap::new(),
            queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with(mut self, coord: &str, versions: &[&str]) -> Self {
        let module = ModuleId::parse(coord).unwrap();
        self.modules
            .entry(module)
            .or_default()
            .extend(versions.iter().map(|v| v.to_string()));
        self
    }

    fn local(mut self) -> Self {
        self.remote = false;
        self.url = format!("file:///repos/{}", self.name);
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn boxed(self) -> Box<dyn ArtifactSource> {
        Box::new(self)
    }
}

#[async_trait]
impl ArtifactSource for MemoryRepo {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &str {
        &self.url
    }

    fn is_remote(&self) -> bool {
        self.remote
    }

    async fn has_version(&self, module: &ModuleId, version: &str) -> miette::Result<bool> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KompoError::Network {
                message: format!("{} is down", self.name),
            }
            .into());
        }
        Ok(self
            .modules
            .get(module)
            .is_some_and(|vs| vs.iter().any(|v| v == version)))
    }

    async fn list_versions(&self, module: &ModuleId) -> miette::Result<Vec<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KompoError::Network {
                message: format!("{} is down", self.name),
            }
            .into());
        }
        Ok(self.modules.get(module).cloned().unwrap_or_default())
    }
}

fn core_project() -> LocalProject {
    LocalProject {
        build: "core".to_string(),
        project_path: ":".to_string(),
        dir: PathBuf::from("../core"),
    }
}

fn core_rules() -> Arc<SubstitutionRules> {
    Arc::new(
        SubstitutionRules::new(vec![SubstitutionRule {
            module: ModuleId::new("org.solverslib", "core"),
            project: core_project(),
        }])
        .unwrap(),
    )
}

fn coord(s: &str) -> Coordinate {
    Coordinate::parse(s).unwrap()
}

fn repository_of(target: &Resolvable) -> (&str, String) {
    match target {
        Resolvable::PublishedArtifact {
            coordinate,
            repository,
        } => (repository.as_str(), coordinate.to_string()),
        other => panic!("expected a published artifact, got {other:?}"),
    }
}

#[tokio::test]
async fn substituted_coordinate_resolves_locally_even_when_published() {
    let resolver = CoordinateResolver::new(
        core_rules(),
        vec![MemoryRepo::new("brott")
            .with("org.solverslib:core", &["1.0.0"])
            .boxed()],
    );

    for requested in ["org.solverslib:core:1.0.0", "org.solverslib:core"] {
        let resolution = resolver.resolve(&coord(requested)).await.unwrap();
        assert!(resolution.is_local());
        assert_eq!(
            resolution.target,
            Resolvable::LocalBuildOutput {
                project: core_project()
            }
        );
    }
}

#[tokio::test]
async fn unsubstituted_sibling_goes_to_repositories() {
    let resolver = CoordinateResolver::new(
        core_rules(),
        vec![MemoryRepo::new("brott")
            .with("org.solverslib:pedroPathing", &["1.0.0"])
            .boxed()],
    );

    let resolution = resolver
        .resolve(&coord("org.solverslib:pedroPathing:1.0.0"))
        .await
        .unwrap();
    let (repo, resolved) = repository_of(&resolution.target);
    assert_eq!(repo, "brott");
    assert_eq!(resolved, "org.solverslib:pedroPathing:1.0.0");
}

#[tokio::test]
async fn first_declared_repository_wins() {
    let resolver = CoordinateResolver::new(
        Arc::new(SubstitutionRules::default()),
        vec![
            MemoryRepo::new("brott")
                .with("com.pedropathing:ftc", &["2.0.4"])
                .boxed(),
            MemoryRepo::new("pedro")
                .with("com.pedropathing:ftc", &["2.0.4", "2.1.0"])
                .boxed(),
        ],
    );

    let resolution = resolver
        .resolve(&coord("com.pedropathing:ftc:2.0.4"))
        .await
        .unwrap();
    assert_eq!(repository_of(&resolution.target).0, "brott");

    // first match, not best match: brott lists an older version but still wins
    let latest = resolver.resolve(&coord("com.pedropathing:ftc")).await.unwrap();
    assert_eq!(
        repository_of(&latest.target),
        ("brott", "com.pedropathing:ftc:2.0.4".to_string())
    );
}

#[tokio::test]
async fn later_repository_serves_what_earlier_ones_lack() {
    let resolver = CoordinateResolver::new(
        Arc::new(SubstitutionRules::default()),
        vec![
            MemoryRepo::new("brott").boxed(),
            MemoryRepo::new("pedro")
                .with("com.pedropathing:ftc", &["2.0.4"])
                .boxed(),
        ],
    );
    let resolution = resolver
        .resolve(&coord("com.pedropathing:ftc:2.0.4"))
        .await
        .unwrap();
    assert_eq!(repository_of(&resolution.target).0, "pedro");
}

#[tokio::test]
async fn missing_coordinate_lists_every_searched_repository() {
    let resolver = CoordinateResolver::new(
        core_rules(),
        vec![MemoryRepo::new("brott").boxed(), MemoryRepo::new("pedro").boxed()],
    );

    let err = resolver
        .resolve(&coord("org.example:nowhere:1.0"))
        .await
        .unwrap_err();
    match err.downcast_ref::<KompoError>() {
        Some(KompoError::CoordinateNotFound {
            coordinate,
            searched,
        }) => {
            assert_eq!(coordinate, "org.example:nowhere:1.0");
            assert_eq!(
                searched,
                &[
                    "brott (https://brott.example/maven)".to_string(),
                    "pedro (https://pedro.example/maven)".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("brott (https://brott.example/maven)"));
}

#[tokio::test]
async fn no_repositories_means_not_found() {
    let resolver = CoordinateResolver::new(Arc::new(SubstitutionRules::default()), Vec::new());
    let err = resolver
        .resolve(&coord("org.ejml:ejml-simple:0.39"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no repositories declared"));
}

#[tokio::test]
async fn failing_repository_is_skipped() {
    let resolver = CoordinateResolver::new(
        Arc::new(SubstitutionRules::default()),
        vec![
            MemoryRepo::new("brott").failing().boxed(),
            MemoryRepo::new("pedro")
                .with("com.pedropathing:ftc", &["2.0.4"])
                .boxed(),
        ],
    );
    let resolution = resolver
        .resolve(&coord("com.pedropathing:ftc:2.0.4"))
        .await
        .unwrap();
    assert_eq!(repository_of(&resolution.target).0, "pedro");
}

#[tokio::test]
async fn offline_never_queries_remote_repositories() {
    let remote = MemoryRepo::new("brott").with("com.pedropathing:ftc", &["2.0.4"]);
    let remote_queries = remote.queries.clone();
    let resolver = CoordinateResolver::new(
        Arc::new(SubstitutionRules::default()),
        vec![
            remote.boxed(),
            MemoryRepo::new("m2")
                .local()
                .with("org.ejml:ejml-simple", &["0.39"])
                .boxed(),
        ],
    )
    .offline(true);

    assert_eq!(resolver.searched(), ["m2 (file:///repos/m2)"]);
    let ejml = resolver
        .resolve(&coord("org.ejml:ejml-simple:0.39"))
        .await
        .unwrap();
    assert_eq!(repository_of(&ejml.target).0, "m2");
    assert!(resolver
        .resolve(&coord("com.pedropathing:ftc:2.0.4"))
        .await
        .is_err());
    assert_eq!(remote_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dynamic_versions_select_highest_listed() {
    let resolver = CoordinateResolver::new(
        Arc::new(SubstitutionRules::default()),
        vec![MemoryRepo::new("pedro")
            .with(
                "com.pedropathing:ftc",
                &["1.0.9", "2.0.1", "2.0.4", "2.1.0-SNAPSHOT"],
            )
            .boxed()],
    );

    let cases = [
        ("com.pedropathing:ftc", "2.0.4"),
        ("com.pedropathing:ftc:latest.release", "2.0.4"),
        ("com.pedropathing:ftc:latest.integration", "2.1.0-SNAPSHOT"),
        ("com.pedropathing:ftc:1.+", "1.0.9"),
        ("com.pedropathing:ftc:[2.0,2.0.3]", "2.0.1"),
    ];
    for (requested, expected) in cases {
        let resolution = resolver.resolve(&coord(requested)).await.unwrap();
        let (_, resolved) = repository_of(&resolution.target);
        assert_eq!(resolved, format!("com.pedropathing:ftc:{expected}"), "{requested}");
    }
}

#[tokio::test]
async fn resolve_all_preserves_request_order() {
    let resolver = CoordinateResolver::new(
        core_rules(),
        vec![MemoryRepo::new("pedro")
            .with("com.pedropathing:ftc", &["2.0.4"])
            .with("org.ejml:ejml-simple", &["0.39"])
            .boxed()],
    );
    let requests = vec![
        coord("org.ejml:ejml-simple:0.39"),
        coord("org.solverslib:core"),
        coord("org.example:nowhere:1.0"),
        coord("com.pedropathing:ftc:2.0.4"),
    ];

    let results = resolver.resolve_all(&requests, 2).await;
    assert_eq!(results.len(), 4);
    for (request, result) in requests.iter().zip(&results) {
        if let Ok(resolution) = result {
            assert_eq!(&resolution.requested, request);
        }
    }
    assert!(results[1].as_ref().unwrap().is_local());
    assert!(results[2].is_err());
    assert!(results[3].is_ok());
}

fn file_repo_with_metadata(
    root: &std::path::Path,
    name: &str,
    versions: &[&str],
) -> Box<dyn ArtifactSource> {
    let dir = root.join("com/pedropathing/ftc");
    std::fs::create_dir_all(&dir).unwrap();
    let listed: String = versions
        .iter()
        .map(|v| format!("<version>{v}</version>"))
        .collect();
    let xml =
        format!("<metadata><versioning><versions>{listed}</versions></versioning></metadata>");
    std::fs::write(dir.join("maven-metadata.xml"), &xml).unwrap();
    for (sidecar, digest) in checksum::sidecar_files("maven-metadata.xml", xml.as_bytes()) {
        std::fs::write(dir.join(sidecar), digest).unwrap();
    }
    Box::new(FileRepository::new(
        MavenRepository::directory(name, root),
        root.to_path_buf(),
    ))
}

#[tokio::test]
async fn checksum_mismatch_skips_to_next_repository() {
    let mirror = tempfile::tempdir().unwrap();
    let m2 = tempfile::tempdir().unwrap();
    let tampered = file_repo_with_metadata(mirror.path(), "mirror", &["2.0.4"]);
    let intact = file_repo_with_metadata(m2.path(), "m2", &["2.0.1"]);
    std::fs::write(
        mirror.path().join("com/pedropathing/ftc/maven-metadata.xml"),
        "<metadata><versioning><versions><version>9.9.9</version></versions></versioning></metadata>",
    )
    .unwrap();

    let resolver =
        CoordinateResolver::new(Arc::new(SubstitutionRules::default()), vec![tampered, intact]);
    let resolution = resolver
        .resolve(&coord("com.pedropathing:ftc:latest.release"))
        .await
        .unwrap();
    assert_eq!(
        repository_of(&resolution.target),
        ("m2", "com.pedropathing:ftc:2.0.1".to_string())
    );
}
