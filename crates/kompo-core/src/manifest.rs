use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use kompo_util::errors::KompoError;
use kompo_util::git;

use crate::coordinate::ModuleId;
use crate::dependency::{Dependency, DependencyDecl};

/// Name of the manifest file every kompo project carries.
pub const MANIFEST_FILE: &str = "Kompo.toml";

/// The parsed representation of a `Kompo.toml` file.
///
/// Unknown sections (plugin and SDK blocks carried over from Gradle builds)
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectMetadata,

    /// Repositories searched for published artifacts, in declared order.
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, Dependency>,

    #[serde(default, rename = "include-build")]
    pub include_builds: Vec<IncludeBuild>,

    #[serde(default)]
    pub publication: Option<PublicationConfig>,
}

/// Project identity from the `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A Maven repository reference: an alias or URL string, or a detailed table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Url(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

/// An `[[include-build]]` entry: another project whose outputs may stand in
/// for published coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeBuild {
    /// Directory of the included build, relative to this manifest.
    pub path: String,
    /// Build name; defaults to the directory name.
    #[serde(default)]
    pub name: Option<String>,
    /// Explicit substitutions. When empty, the included build's own published
    /// coordinate is substituted.
    #[serde(default)]
    pub substitute: Vec<SubstituteEntry>,
}

/// `substitute(module("group:artifact")).using(project(":path"))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstituteEntry {
    pub module: String,
    #[serde(default = "default_project_path")]
    pub project: String,
}

fn default_project_path() -> String {
    ":".to_string()
}

/// Maven publication settings from `[publication]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationConfig {
    #[serde(default = "default_publication_name")]
    pub name: String,
    #[serde(default, rename = "group-id")]
    pub group_id: Option<String>,
    #[serde(default, rename = "artifact-id")]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Repository whose nearest tag supplies the version when none is
    /// declared, relative to the project directory.
    #[serde(default, rename = "git-dir")]
    pub git_dir: Option<String>,
    /// Extension of the main binary (`jar` or `aar`).
    #[serde(default = "default_packaging")]
    pub packaging: String,
    /// Documentation jars to attach: `dokka-html`, `dokka-javadoc`.
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub sources: bool,
    /// Per-artifact path overrides keyed by `binary`, `dokka-html`,
    /// `dokka-javadoc` or `sources`.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

fn default_publication_name() -> String {
    "release".to_string()
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl Manifest {
    /// Load and parse a `Kompo.toml` file from the given path.
    ///
    /// Before parsing, `${env:VAR}` references are resolved using `.kompo.env`
    /// (if present alongside the manifest) and process environment variables.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KompoError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let env_vars =
            crate::properties::load_env_file(&dir.join(crate::properties::ENV_FILE))
                .unwrap_or_default();
        let resolved = crate::properties::interpolate(&content, &env_vars);

        Self::parse_toml(&resolved).map_err(|e| {
            KompoError::Manifest {
                message: format!("{}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Parse a `Kompo.toml` from a string (no interpolation).
    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            KompoError::Manifest {
                message: format!("Failed to parse Kompo.toml: {e}"),
            }
            .into()
        })
    }

    /// All `[dependencies]` entries with parsed coordinates, in key order.
    pub fn dependency_decls(&self) -> miette::Result<Vec<DependencyDecl>> {
        self.dependencies
            .iter()
            .map(|(name, dep)| {
                dep.to_decl(name).ok_or_else(|| {
                    KompoError::Manifest {
                        message: format!(
                            "dependency '{name}' is not a valid group:artifact[:version] coordinate"
                        ),
                    }
                    .into()
                })
            })
            .collect()
    }

    /// The coordinate this project publishes under: `[publication]` ids first,
    /// then `[project] group` and `name`.
    pub fn published_module(&self) -> Option<ModuleId> {
        let publication = self.publication.as_ref();
        let group = publication
            .and_then(|p| p.group_id.clone())
            .or_else(|| self.project.group.clone())?;
        let artifact = publication
            .and_then(|p| p.artifact_id.clone())
            .unwrap_or_else(|| self.project.name.clone());
        Some(ModuleId::new(group, artifact))
    }

    /// The version this project publishes: `[publication] version`, then
    /// `[project] version`.
    pub fn published_version(&self) -> Option<&str> {
        self.publication
            .as_ref()
            .and_then(|p| p.version.as_deref())
            .or(self.project.version.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// The published version, falling back to the tag nearest to `HEAD` in
    /// `[publication] git-dir`. A tagged `HEAD` publishes the tag itself
    /// (without a leading `v`); commits past it publish `<tag>-SNAPSHOT`.
    pub fn resolve_version(&self, project_dir: &Path) -> miette::Result<Option<String>> {
        if let Some(version) = self.published_version() {
            return Ok(Some(version.to_string()));
        }
        let Some(git_dir) = self.publication.as_ref().and_then(|p| p.git_dir.as_deref()) else {
            return Ok(None);
        };
        let described = git::describe_nearest_tag(&project_dir.join(git_dir))?;
        let tag = described.tag.as_str();
        let base = match tag.strip_prefix('v') {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
            _ => tag,
        };
        let version = if described.commits_since == 0 {
            base.to_string()
        } else {
            format!("{base}-SNAPSHOT")
        };
        tracing::debug!("version {version} from git tag {tag}");
        Ok(Some(version))
    }
}
