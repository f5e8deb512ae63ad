//! Shared setup for every operation: the composite build, the global
//! config, and the ordered repository list.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kompo_core::composite::CompositeBuild;
use kompo_core::config::GlobalConfig;
use kompo_core::coordinate::Coordinate;
use kompo_core::dependency::DependencyDecl;
use kompo_core::manifest::{Manifest, MANIFEST_FILE};
use kompo_maven::download;
use kompo_maven::repository::MavenRepository;
use kompo_maven::source;
use kompo_resolver::graph::BuildGraph;
use kompo_resolver::resolver::{CoordinateResolver, Resolution, Resolvable};
use kompo_util::errors::KompoError;

/// Everything an operation needs, loaded once per invocation.
pub struct Context {
    pub composite: CompositeBuild,
    pub config: GlobalConfig,
    pub repositories: Vec<MavenRepository>,
}

/// One declared dependency and how it resolved.
pub struct Outcome {
    pub decl: DependencyDecl,
    pub result: miette::Result<Resolution>,
}

impl Context {
    /// Load the composite build rooted at `manifest_path` and the global
    /// config. Fails on duplicate substitution rules and malformed
    /// repository entries before anything is resolved.
    pub fn load(manifest_path: &Path) -> miette::Result<Self> {
        let config = GlobalConfig::load()?;
        Self::with_config(manifest_path, config)
    }

    pub fn with_config(manifest_path: &Path, config: GlobalConfig) -> miette::Result<Self> {
        let composite = CompositeBuild::load(manifest_path)?;
        let repositories =
            build_repositories(&composite.manifest, &composite.root_dir, &config)?;
        Ok(Self {
            composite,
            config,
            repositories,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.composite.manifest
    }

    pub fn project_name(&self) -> &str {
        &self.composite.manifest.project.name
    }

    /// Offline when requested on the command line or in the global config.
    pub fn offline(&self, flag: bool) -> bool {
        flag || self.config.resolve.offline
    }

    /// A resolver over this build's rules and repositories.
    pub fn resolver(&self, offline: bool) -> miette::Result<CoordinateResolver> {
        let client = download::build_client()?;
        let sources = self
            .repositories
            .iter()
            .cloned()
            .map(|repo| source::open_source(repo, &client))
            .collect();
        let rules = Arc::new(self.composite.rules.clone());
        Ok(CoordinateResolver::new(rules, sources).offline(offline))
    }

    /// Resolve every declared dependency of the root project, in
    /// declaration order.
    pub async fn resolve_declared(&self, offline: bool) -> miette::Result<Vec<Outcome>> {
        let decls = self.manifest().dependency_decls()?;
        let coordinates: Vec<Coordinate> = decls.iter().map(|d| d.coordinate.clone()).collect();
        let resolver = self.resolver(offline)?;

        let sp = kompo_util::progress::spinner(&format!(
            "Resolving {} dependencies...",
            coordinates.len()
        ));
        let results = resolver
            .resolve_all(&coordinates, self.config.resolve.jobs)
            .await;
        sp.finish_and_clear();

        Ok(decls
            .into_iter()
            .zip(results)
            .map(|(decl, result)| Outcome { decl, result })
            .collect())
    }

    /// Build graph of the root project: one edge per resolved dependency,
    /// plus `BuildsBefore` edges between local projects whose own
    /// dependencies hit a substitution rule of this build.
    pub fn build_graph(&self, outcomes: &[Outcome]) -> BuildGraph {
        let mut graph = BuildGraph::new(self.project_name());
        let root = graph.root();
        let mut pending = VecDeque::new();

        for outcome in outcomes {
            if let Ok(resolution) = &outcome.result {
                graph.record(root, resolution);
                if let Resolvable::LocalBuildOutput { project } = &resolution.target {
                    pending.push_back(project.clone());
                }
            }
        }

        let mut seen = Vec::new();
        while let Some(project) = pending.pop_front() {
            if seen.contains(&project) {
                continue;
            }
            seen.push(project.clone());
            let requester = graph.local_node(&project);
            let Some(manifest) = self.composite.manifest_of(&project) else {
                continue;
            };
            let Ok(decls) = manifest.dependency_decls() else {
                tracing::warn!("skipping dependencies of project {project}: invalid manifest");
                continue;
            };
            for decl in decls {
                if let Some(target) = self.composite.rules.lookup(&decl.coordinate) {
                    let resolution = Resolution {
                        requested: decl.coordinate.clone(),
                        target: Resolvable::LocalBuildOutput {
                            project: target.clone(),
                        },
                    };
                    graph.record(requester, &resolution);
                    pending.push_back(target.clone());
                }
            }
        }

        graph
    }
}

/// Locate `Kompo.toml`: the explicit path if given, otherwise the nearest
/// one at or above the current directory.
pub fn find_manifest(explicit: Option<&Path>) -> miette::Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(KompoError::Manifest {
            message: format!("{} does not exist", path.display()),
        }
        .into());
    }
    let cwd = std::env::current_dir().map_err(KompoError::Io)?;
    kompo_util::fs::find_ancestor_with(&cwd, MANIFEST_FILE)
        .map(|dir| dir.join(MANIFEST_FILE))
        .ok_or_else(|| {
            KompoError::Manifest {
                message: format!(
                    "could not find {MANIFEST_FILE} in {} or any parent directory",
                    cwd.display()
                ),
            }
            .into()
        })
}

/// The manifest's repositories in declared order, with relative `file://`
/// paths anchored at the project directory and global credentials applied.
pub fn build_repositories(
    manifest: &Manifest,
    root_dir: &Path,
    config: &GlobalConfig,
) -> miette::Result<Vec<MavenRepository>> {
    let mut repos: Vec<MavenRepository> = Vec::with_capacity(manifest.repositories.len());
    for entry in &manifest.repositories {
        let repo = MavenRepository::from_entry(entry)?.anchored_at(root_dir);
        if repos.iter().any(|r| r.name == repo.name) {
            return Err(KompoError::Manifest {
                message: format!("repository '{}' is declared twice", repo.name),
            }
            .into());
        }
        let credentials = config.credentials.get(&repo.name);
        repos.push(repo.with_credentials(credentials));
    }
    Ok(repos)
}
