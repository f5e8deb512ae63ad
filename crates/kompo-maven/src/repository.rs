//! Maven repository configuration: aliases, URL layout, credentials.

use std::path::{Path, PathBuf};

use kompo_core::config::CredentialEntry;
use kompo_core::coordinate::ModuleId;
use kompo_core::manifest::RepositoryEntry;
use kompo_util::errors::KompoError;

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// Google's Maven repository.
pub const GOOGLE_MAVEN_URL: &str = "https://maven.google.com";

/// Gradle Plugin Portal's Maven view.
pub const GRADLE_PLUGIN_PORTAL_URL: &str = "https://plugins.gradle.org/m2";

/// A configured Maven repository with optional credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenRepository {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MavenRepository {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        }
    }

    /// Build a repository from a manifest entry.
    ///
    /// Bare strings are either a well-known alias (`maven-central`, `google`,
    /// `gradle-plugin-portal`, `maven-local`) or a URL; tables may omit `url`
    /// when `name` is an alias.
    pub fn from_entry(entry: &RepositoryEntry) -> miette::Result<Self> {
        match entry {
            RepositoryEntry::Url(s) => {
                if let Some(repo) = Self::well_known(s) {
                    return Ok(repo);
                }
                if !s.contains("://") {
                    return Err(unknown_alias(s));
                }
                Ok(Self::new(&name_from_url(s), s))
            }
            RepositoryEntry::Detailed {
                name,
                url,
                username,
                password,
            } => {
                let mut repo = match (name.as_deref(), url.as_deref()) {
                    (Some(name), Some(url)) => Self::new(name, url),
                    (None, Some(url)) => Self::new(&name_from_url(url), url),
                    (Some(name), None) => {
                        Self::well_known(name).ok_or_else(|| unknown_alias(name))?
                    }
                    (None, None) => {
                        return Err(KompoError::Manifest {
                            message: "repository entry needs a `name` or a `url`".to_string(),
                        }
                        .into())
                    }
                };
                repo.username = username.clone().filter(|u| !u.is_empty());
                repo.password = password.clone().filter(|p| !p.is_empty());
                Ok(repo)
            }
        }
    }

    /// Expand a well-known repository alias. Gradle's camelCase spellings
    /// are accepted too.
    pub fn well_known(alias: &str) -> Option<Self> {
        match alias {
            "maven-central" | "mavenCentral" => Some(Self::new("maven-central", MAVEN_CENTRAL_URL)),
            "google" => Some(Self::new("google", GOOGLE_MAVEN_URL)),
            "gradle-plugin-portal" | "gradlePluginPortal" => Some(Self::new(
                "gradle-plugin-portal",
                GRADLE_PLUGIN_PORTAL_URL,
            )),
            "maven-local" | "mavenLocal" => Some(Self::maven_local()),
            _ => None,
        }
    }

    /// `~/.m2/repository` as a file repository.
    pub fn maven_local() -> Self {
        let dir = kompo_util::fs::home_dir().join(".m2").join("repository");
        Self::new("maven-local", &format!("file://{}", dir.display()))
    }

    /// A file repository rooted at `dir`.
    pub fn directory(name: &str, dir: &Path) -> Self {
        Self::new(name, &format!("file://{}", dir.display()))
    }

    /// Directory of a `file://` repository, or `None` for remote ones.
    pub fn local_dir(&self) -> Option<PathBuf> {
        self.url.strip_prefix("file://").map(PathBuf::from)
    }

    /// Anchor a relative `file://` path at `base` (the manifest directory).
    pub fn anchored_at(mut self, base: &Path) -> Self {
        if let Some(dir) = self.local_dir() {
            if dir.is_relative() {
                self.url = format!("file://{}", base.join(dir).display());
            }
        }
        self
    }

    /// Fill in credentials from the global config when the manifest has none.
    pub fn with_credentials(mut self, credentials: Option<&CredentialEntry>) -> Self {
        if let Some(c) = credentials {
            if self.username.is_none() {
                self.username = c.username.clone();
            }
            if self.password.is_none() {
                self.password = c.password.clone();
            }
        }
        self
    }

    /// `name (url)`, as listed in resolution errors.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.url)
    }

    /// Standard Maven layout path of a module: `org/solverslib/core`.
    pub fn module_path(module: &ModuleId) -> String {
        format!("{}/{}", module.group.replace('.', "/"), module.artifact)
    }

    /// Standard Maven layout path of a version directory:
    /// `org/solverslib/core/1.0.0`.
    pub fn version_path(module: &ModuleId, version: &str) -> String {
        format!("{}/{version}", Self::module_path(module))
    }

    /// Full URL to a file inside a version directory.
    pub fn file_url(&self, module: &ModuleId, version: &str, filename: &str) -> String {
        format!("{}/{}/{filename}", self.url, Self::version_path(module, version))
    }

    /// URL to the POM of a version.
    pub fn pom_url(&self, module: &ModuleId, version: &str) -> String {
        self.file_url(module, version, &format!("{}-{version}.pom", module.artifact))
    }

    /// URL to the Gradle Module Metadata `.module` file of a version.
    pub fn gradle_module_url(&self, module: &ModuleId, version: &str) -> String {
        self.file_url(module, version, &format!("{}-{version}.module", module.artifact))
    }

    /// URL to the artifact-level `maven-metadata.xml` (version listing).
    pub fn metadata_url(&self, module: &ModuleId) -> String {
        format!("{}/{}/maven-metadata.xml", self.url, Self::module_path(module))
    }

    /// Whether this repository has authentication configured.
    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

fn unknown_alias(alias: &str) -> miette::Report {
    KompoError::Manifest {
        message: format!(
            "unknown repository alias '{alias}' (expected maven-central, google, gradle-plugin-portal, maven-local or a URL)"
        ),
    }
    .into()
}

/// Derive a repository name from its host: `https://maven.brott.dev/` -> `maven.brott.dev`.
fn name_from_url(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host = without_scheme.split('/').next().unwrap_or(without_scheme);
    if host.is_empty() {
        url.trim_end_matches('/').to_string()
    } else {
        host.to_string()
    }
}
