//! Composite builds: a root project plus the included builds whose outputs
//! replace published coordinates during development.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kompo_util::errors::KompoError;

use crate::coordinate::ModuleId;
use crate::manifest::{IncludeBuild, Manifest, MANIFEST_FILE};
use crate::substitution::{LocalProject, SubstitutionRule, SubstitutionRules};

/// An included build as found on disk.
#[derive(Debug, Clone)]
pub struct IncludedBuild {
    pub name: String,
    pub dir: PathBuf,
    /// The included build's own manifest, when it has one.
    pub manifest: Option<Manifest>,
}

/// The root project together with its included builds and the frozen rule
/// set derived from them.
#[derive(Debug, Clone)]
pub struct CompositeBuild {
    pub root_dir: PathBuf,
    pub manifest: Manifest,
    pub included: Vec<IncludedBuild>,
    pub rules: SubstitutionRules,
}

impl CompositeBuild {
    /// Load the manifest at `manifest_path` and every build it includes.
    pub fn load(manifest_path: &Path) -> miette::Result<Self> {
        let manifest = Manifest::from_path(manifest_path)?;
        let root_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_manifest(root_dir, manifest)
    }

    /// Assemble a composite build from an already parsed root manifest.
    ///
    /// Included builds are not expanded recursively: only the root's
    /// `[[include-build]]` entries contribute rules.
    pub fn from_manifest(root_dir: PathBuf, manifest: Manifest) -> miette::Result<Self> {
        let mut included = Vec::new();
        let mut rules = Vec::new();
        let mut names = HashSet::new();

        for include in &manifest.include_builds {
            let build = load_included(&root_dir, include)?;
            if !names.insert(build.name.clone()) {
                return Err(KompoError::Manifest {
                    message: format!(
                        "two included builds are named '{}'; set a distinct `name`",
                        build.name
                    ),
                }
                .into());
            }
            rules.extend(rules_for(include, &build)?);
            included.push(build);
        }

        let rules = SubstitutionRules::new(rules)?;
        for rule in rules.iter() {
            tracing::debug!("substitution {} -> {}", rule.module, rule.project);
        }

        Ok(Self {
            root_dir,
            manifest,
            included,
            rules,
        })
    }

    /// The module this root project publishes, if it declares one.
    pub fn root_module(&self) -> Option<ModuleId> {
        self.manifest.published_module()
    }

    /// Manifest of the included build a local project belongs to, or of the
    /// subproject directory itself when it carries its own `Kompo.toml`.
    pub fn manifest_of(&self, project: &LocalProject) -> Option<Manifest> {
        let sub_manifest = project.dir.join(MANIFEST_FILE);
        if project.project_path != ":" && sub_manifest.is_file() {
            return Manifest::from_path(&sub_manifest).ok();
        }
        self.included
            .iter()
            .find(|b| b.name == project.build)
            .and_then(|b| b.manifest.clone())
    }

    /// Version the local project would publish under, used when a
    /// substituted dependency is written into a POM.
    pub fn local_version(&self, project: &LocalProject) -> miette::Result<Option<String>> {
        match self.manifest_of(project) {
            Some(manifest) => manifest.resolve_version(&project.dir),
            None => Ok(None),
        }
    }
}

fn load_included(root_dir: &Path, include: &IncludeBuild) -> miette::Result<IncludedBuild> {
    let dir = root_dir.join(&include.path);
    if !dir.is_dir() {
        return Err(KompoError::Manifest {
            message: format!(
                "included build '{}' does not exist ({})",
                include.path,
                dir.display()
            ),
        }
        .into());
    }

    let name = match &include.name {
        Some(n) => n.clone(),
        None => Path::new(include.path.trim_end_matches(['/', '\\']))
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| KompoError::Manifest {
                message: format!(
                    "cannot derive a name for included build '{}'; set `name`",
                    include.path
                ),
            })?,
    };

    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = if manifest_path.is_file() {
        Some(Manifest::from_path(&manifest_path)?)
    } else {
        None
    };

    Ok(IncludedBuild {
        name,
        dir,
        manifest,
    })
}

fn rules_for(
    include: &IncludeBuild,
    build: &IncludedBuild,
) -> miette::Result<Vec<SubstitutionRule>> {
    if include.substitute.is_empty() {
        // Implicit substitution of the build's own published coordinate.
        let module = build.manifest.as_ref().and_then(Manifest::published_module);
        return Ok(match module {
            Some(module) => vec![SubstitutionRule {
                module,
                project: local_project(build, ":"),
            }],
            None => {
                tracing::warn!(
                    "included build '{}' declares no substitutions and publishes no coordinate",
                    build.name
                );
                Vec::new()
            }
        });
    }

    include
        .substitute
        .iter()
        .map(|entry| {
            let module = ModuleId::parse(&entry.module).ok_or_else(|| KompoError::Manifest {
                message: format!(
                    "substitute module '{}' in included build '{}' is not group:artifact",
                    entry.module, build.name
                ),
            })?;
            if !entry.project.starts_with(':') {
                return Err(KompoError::Manifest {
                    message: format!(
                        "project path '{}' must start with ':' (use \":\" for the build's root project)",
                        entry.project
                    ),
                }
                .into());
            }
            Ok(SubstitutionRule {
                module,
                project: local_project(build, &entry.project),
            })
        })
        .collect()
}

fn local_project(build: &IncludedBuild, project_path: &str) -> LocalProject {
    let dir = project_path
        .split(':')
        .filter(|s| !s.is_empty())
        .fold(build.dir.clone(), |dir, segment| dir.join(segment));
    LocalProject {
        build: build.name.clone(),
        project_path: project_path.to_string(),
        dir,
    }
}
