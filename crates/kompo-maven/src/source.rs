//! Repositories the resolver can query, behind one async trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;

use kompo_core::coordinate::ModuleId;
use kompo_util::errors::KompoError;

use crate::metadata::{self, MavenMetadata};
use crate::repository::MavenRepository;
use crate::{checksum, download};

/// A Maven repository as seen by coordinate resolution.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Repository name as declared (or derived from its URL).
    fn name(&self) -> &str;

    /// Base URL.
    fn location(&self) -> &str;

    /// Whether queries go over the network.
    fn is_remote(&self) -> bool;

    /// Whether the repository has `version` of `module`, judged by the
    /// presence of its POM or Gradle module file.
    async fn has_version(&self, module: &ModuleId, version: &str) -> miette::Result<bool>;

    /// Versions of `module` the repository lists, in listing order. Empty
    /// when the repository does not know the module.
    async fn list_versions(&self, module: &ModuleId) -> miette::Result<Vec<String>>;

    /// `name (url)`, as listed in resolution errors.
    fn describe(&self) -> String {
        format!("{} ({})", self.name(), self.location())
    }
}

/// Open the right source for a repository: a directory for `file://` URLs,
/// HTTP otherwise.
pub fn open_source(repo: MavenRepository, client: &Client) -> Box<dyn ArtifactSource> {
    match repo.local_dir() {
        Some(root) => Box::new(FileRepository::new(repo, root)),
        None => Box::new(HttpRepository::new(repo, client.clone())),
    }
}

/// Maven layout served over HTTP(S).
pub struct HttpRepository {
    repo: MavenRepository,
    client: Client,
}

impl HttpRepository {
    pub fn new(repo: MavenRepository, client: Client) -> Self {
        Self { repo, client }
    }

    fn version_metadata_url(&self, module: &ModuleId, version: &str) -> String {
        self.repo.file_url(module, version, "maven-metadata.xml")
    }
}

#[async_trait]
impl ArtifactSource for HttpRepository {
    fn name(&self) -> &str {
        &self.repo.name
    }

    fn location(&self) -> &str {
        &self.repo.url
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn has_version(&self, module: &ModuleId, version: &str) -> miette::Result<bool> {
        if download::exists(&self.client, &self.repo, &self.repo.pom_url(module, version)).await? {
            return Ok(true);
        }
        let module_url = self.repo.gradle_module_url(module, version);
        if download::exists(&self.client, &self.repo, &module_url).await? {
            return Ok(true);
        }
        if version.ends_with("-SNAPSHOT") {
            // Remote snapshots are stored under timestamped file names.
            let url = self.version_metadata_url(module, version);
            if let Some(xml) = download::download_text(&self.client, &self.repo, &url).await? {
                let snapshot = metadata::parse_snapshot_metadata(&xml)?;
                return Ok(snapshot.snapshot_base(&module.artifact).is_some());
            }
        }
        Ok(false)
    }

    async fn list_versions(&self, module: &ModuleId) -> miette::Result<Vec<String>> {
        let url = self.repo.metadata_url(module);
        let Some(bytes) = download::download_bytes(&self.client, &self.repo, &url).await? else {
            return Ok(Vec::new());
        };
        checksum::verify(&self.client, &self.repo, &url, &bytes).await?;
        let meta = metadata::parse_metadata(&String::from_utf8_lossy(&bytes))?;
        Ok(meta.all_versions())
    }
}

/// Maven layout in a local directory (`file://` URLs, `maven-local`).
pub struct FileRepository {
    repo: MavenRepository,
    root: PathBuf,
}

impl FileRepository {
    pub fn new(repo: MavenRepository, root: PathBuf) -> Self {
        Self { repo, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module_dir(&self, module: &ModuleId) -> PathBuf {
        self.root.join(MavenRepository::module_path(module))
    }

    fn version_dir(&self, module: &ModuleId, version: &str) -> PathBuf {
        self.root.join(MavenRepository::version_path(module, version))
    }

    async fn has_descriptor(&self, module: &ModuleId, version: &str) -> bool {
        let dir = self.version_dir(module, version);
        for ext in ["pom", "module"] {
            let path = dir.join(format!("{}-{version}.{ext}", module.artifact));
            if is_file(&path).await {
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl ArtifactSource for FileRepository {
    fn name(&self) -> &str {
        &self.repo.name
    }

    fn location(&self) -> &str {
        &self.repo.url
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn has_version(&self, module: &ModuleId, version: &str) -> miette::Result<bool> {
        let found = self.has_descriptor(module, version).await;
        tracing::debug!(
            "{}: {module}:{version} {}",
            self.repo.name,
            if found { "found" } else { "missing" }
        );
        Ok(found)
    }

    async fn list_versions(&self, module: &ModuleId) -> miette::Result<Vec<String>> {
        let dir = self.module_dir(module);
        if let Some(meta) = read_local_metadata(&dir, module).await? {
            return Ok(meta.all_versions());
        }

        // No metadata: fall back to the version directories themselves.
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            return Ok(Vec::new());
        };
        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(KompoError::Io)? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_dir && self.has_descriptor(module, &name).await {
                versions.push(name);
            }
        }
        versions.sort();
        Ok(versions)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Read and merge every metadata file of a module in a file repository.
async fn read_local_metadata(
    dir: &Path,
    module: &ModuleId,
) -> miette::Result<Option<MavenMetadata>> {
    let mut documents = Vec::new();
    for name in metadata::LOCAL_METADATA_FILES {
        let path = dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                checksum::verify_file(&path, &bytes).await?;
                documents.push(String::from_utf8_lossy(&bytes).into_owned());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(KompoError::Io(e).into()),
        }
    }
    metadata::merge_documents(module, &documents)
}
