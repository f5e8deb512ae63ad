//! Coordinate resolution: substitution rules first, then the declared
//! repositories in order, first match wins.

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;

use kompo_core::coordinate::Coordinate;
use kompo_core::substitution::{LocalProject, SubstitutionRules};
use kompo_maven::source::ArtifactSource;
use kompo_util::errors::KompoError;

use crate::version::VersionSelector;

/// Where a requested coordinate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolvable {
    /// Build the local project and use its output.
    LocalBuildOutput { project: LocalProject },
    /// Fetch a published artifact. `coordinate` carries the selected
    /// version; `repository` is the serving repository's name.
    PublishedArtifact {
        coordinate: Coordinate,
        repository: String,
    },
}

/// A requested coordinate together with its resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub requested: Coordinate,
    pub target: Resolvable,
}

impl Resolution {
    pub fn is_local(&self) -> bool {
        matches!(self.target, Resolvable::LocalBuildOutput { .. })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Resolvable::LocalBuildOutput { project } => {
                write!(f, "{} -> project {project}", self.requested)
            }
            Resolvable::PublishedArtifact {
                coordinate,
                repository,
            } => write!(f, "{} -> {coordinate} from {repository}", self.requested),
        }
    }
}

/// Row of `kompo resolve --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRecord {
    pub requested: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl From<&Resolution> for ResolutionRecord {
    fn from(r: &Resolution) -> Self {
        match &r.target {
            Resolvable::LocalBuildOutput { project } => Self {
                requested: r.requested.to_string(),
                kind: "local",
                project: Some(project.build_path()),
                coordinate: None,
                repository: None,
            },
            Resolvable::PublishedArtifact {
                coordinate,
                repository,
            } => Self {
                requested: r.requested.to_string(),
                kind: "published",
                project: None,
                coordinate: Some(coordinate.to_string()),
                repository: Some(repository.clone()),
            },
        }
    }
}

/// Resolves coordinates against a fixed rule set and an ordered list of
/// repositories.
pub struct CoordinateResolver {
    rules: Arc<SubstitutionRules>,
    sources: Vec<Box<dyn ArtifactSource>>,
    offline: bool,
}

impl CoordinateResolver {
    pub fn new(rules: Arc<SubstitutionRules>, sources: Vec<Box<dyn ArtifactSource>>) -> Self {
        Self {
            rules,
            sources,
            offline: false,
        }
    }

    /// Skip remote repositories entirely.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn rules(&self) -> &SubstitutionRules {
        &self.rules
    }

    /// Repositories that will be queried, in order.
    fn active_sources(&self) -> impl Iterator<Item = &dyn ArtifactSource> {
        self.sources
            .iter()
            .map(|s| s.as_ref())
            .filter(move |s| !(self.offline && s.is_remote()))
    }

    /// `name (url)` of every repository that will be queried.
    pub fn searched(&self) -> Vec<String> {
        self.active_sources().map(|s| s.describe()).collect()
    }

    /// Resolve one coordinate.
    ///
    /// A matching substitution rule wins regardless of repository contents.
    /// Otherwise repositories are queried sequentially in declared order and
    /// the first that serves the coordinate is used. Repository failures
    /// are logged and treated as "not served".
    pub async fn resolve(&self, requested: &Coordinate) -> miette::Result<Resolution> {
        if let Some(project) = self.rules.lookup(requested) {
            tracing::info!("substituting {requested} with project {project}");
            return Ok(Resolution {
                requested: requested.clone(),
                target: Resolvable::LocalBuildOutput {
                    project: project.clone(),
                },
            });
        }

        let selector = VersionSelector::parse(requested.version());
        for source in self.active_sources() {
            match serves(source, requested, &selector).await {
                Ok(Some(version)) => {
                    tracing::debug!("{requested} served by {} as {version}", source.name());
                    return Ok(Resolution {
                        requested: requested.clone(),
                        target: Resolvable::PublishedArtifact {
                            coordinate: requested.with_version(&version),
                            repository: source.name().to_string(),
                        },
                    });
                }
                Ok(None) => tracing::debug!("{requested} not in {}", source.name()),
                Err(e) => tracing::warn!("skipping {} for {requested}: {e}", source.name()),
            }
        }

        Err(KompoError::CoordinateNotFound {
            coordinate: requested.to_string(),
            searched: self.searched(),
        }
        .into())
    }

    /// Resolve many coordinates, at most `jobs` at a time. Results keep the
    /// order of `coordinates`.
    pub async fn resolve_all(
        &self,
        coordinates: &[Coordinate],
        jobs: usize,
    ) -> Vec<miette::Result<Resolution>> {
        stream::iter(coordinates.iter().map(|c| self.resolve(c)))
            .buffered(jobs.max(1))
            .collect()
            .await
    }
}

/// The version `source` would serve for `requested`, if any.
async fn serves(
    source: &dyn ArtifactSource,
    requested: &Coordinate,
    selector: &VersionSelector,
) -> miette::Result<Option<String>> {
    if let Some(version) = selector.exact() {
        let found = source.has_version(&requested.module, version).await?;
        return Ok(found.then(|| version.to_string()));
    }
    let listed = source.list_versions(&requested.module).await?;
    Ok(selector.select(&listed))
}
