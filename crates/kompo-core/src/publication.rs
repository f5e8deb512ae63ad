//! Publication descriptors: the identity and attached files of a release.

use std::path::{Path, PathBuf};

use serde::Serialize;

use kompo_util::errors::KompoError;

use crate::manifest::Manifest;

/// The role of a file attached to a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// The compiled library (`.jar` or `.aar`).
    Binary,
    /// Javadoc-style API documentation (`dokka-javadoc`).
    ApiDocs,
    /// HTML reference documentation (`dokka-html`).
    ReferenceDocs,
    Sources,
}

impl ArtifactKind {
    /// Parse the key used in `[publication] docs` and `[publication.files]`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "binary" => Some(Self::Binary),
            "dokka-javadoc" | "javadoc" => Some(Self::ApiDocs),
            "dokka-html" | "html-docs" => Some(Self::ReferenceDocs),
            "sources" => Some(Self::Sources),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::ApiDocs => "dokka-javadoc",
            Self::ReferenceDocs => "dokka-html",
            Self::Sources => "sources",
        }
    }

    /// Maven classifier of the published file; the binary has none.
    pub fn classifier(self) -> Option<&'static str> {
        match self {
            Self::Binary => None,
            Self::ApiDocs => Some("javadoc"),
            Self::ReferenceDocs => Some("html-docs"),
            Self::Sources => Some("sources"),
        }
    }
}

/// One file that ships with a publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedArtifact {
    pub kind: ArtifactKind,
    pub classifier: Option<String>,
    pub extension: String,
    /// Where the build left the file.
    pub file: PathBuf,
}

/// Everything a publishing step needs: coordinate plus attached files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDescriptor {
    pub name: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub description: Option<String>,
    pub artifacts: Vec<AttachedArtifact>,
}

impl PublicationDescriptor {
    /// Compose the descriptor from `[publication]`, resolving artifact
    /// paths against `project_dir`.
    pub fn compose(manifest: &Manifest, project_dir: &Path) -> miette::Result<Self> {
        let config = manifest.publication.as_ref().ok_or_else(|| KompoError::Publish {
            message: format!("project '{}' has no [publication] section", manifest.project.name),
        })?;

        let module = manifest.published_module().ok_or_else(|| KompoError::Publish {
            message: "publication needs `group-id` (or `[project] group`)".to_string(),
        })?;
        let version = manifest
            .resolve_version(project_dir)?
            .ok_or_else(|| KompoError::Publish {
                message: "publication needs `version`, `git-dir` or `[project] version`"
                    .to_string(),
            })?;

        for key in config.files.keys() {
            if ArtifactKind::from_key(key).is_none() {
                return Err(KompoError::Publish {
                    message: format!("unknown artifact '{key}' in [publication.files]"),
                }
                .into());
            }
        }

        let mut kinds = vec![ArtifactKind::Binary];
        for doc in &config.docs {
            match ArtifactKind::from_key(doc) {
                Some(kind @ (ArtifactKind::ApiDocs | ArtifactKind::ReferenceDocs)) => {
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                _ => {
                    return Err(KompoError::Publish {
                        message: format!(
                            "unknown documentation jar '{doc}' (expected dokka-html or dokka-javadoc)"
                        ),
                    }
                    .into())
                }
            }
        }
        if config.sources {
            kinds.push(ArtifactKind::Sources);
        }

        let artifact_id = module.artifact.clone();
        let artifacts = kinds
            .into_iter()
            .map(|kind| {
                let extension = match kind {
                    ArtifactKind::Binary => config.packaging.clone(),
                    _ => "jar".to_string(),
                };
                let relative = config
                    .files
                    .get(kind.key())
                    .cloned()
                    .unwrap_or_else(|| default_location(kind, &artifact_id, &extension));
                AttachedArtifact {
                    kind,
                    classifier: kind.classifier().map(str::to_string),
                    extension,
                    file: project_dir.join(relative),
                }
            })
            .collect();

        Ok(Self {
            name: config.name.clone(),
            group_id: module.group,
            artifact_id,
            version,
            packaging: config.packaging.clone(),
            description: manifest.project.description.clone(),
            artifacts,
        })
    }

    /// Name of `artifact` inside a Maven repository:
    /// `<artifactId>-<version>[-<classifier>].<ext>`.
    pub fn repository_file_name(&self, artifact: &AttachedArtifact) -> String {
        match &artifact.classifier {
            Some(c) => format!(
                "{}-{}-{c}.{}",
                self.artifact_id, self.version, artifact.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, artifact.extension),
        }
    }

    /// File name of the generated POM.
    pub fn pom_file_name(&self) -> String {
        format!("{}-{}.pom", self.artifact_id, self.version)
    }

    /// Attached files that do not exist on disk.
    pub fn missing_files(&self) -> Vec<&AttachedArtifact> {
        self.artifacts.iter().filter(|a| !a.file.is_file()).collect()
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }
}

fn default_location(kind: ArtifactKind, artifact_id: &str, extension: &str) -> String {
    match kind.classifier() {
        None => format!("build/outputs/{artifact_id}.{extension}"),
        Some(c) => format!("build/libs/{artifact_id}-{c}.jar"),
    }
}
