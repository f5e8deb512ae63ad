//! Writing a publication into a Maven repository: renamed artifacts, POM,
//! checksum sidecars and merged `maven-metadata.xml`.

use std::path::{Path, PathBuf};

use reqwest::Client;

use kompo_core::coordinate::ModuleId;
use kompo_core::publication::PublicationDescriptor;
use kompo_util::errors::KompoError;

use crate::checksum;
use crate::download;
use crate::metadata::{self, MavenMetadata};
use crate::repository::MavenRepository;

/// A file to be placed in the version directory.
#[derive(Debug, Clone)]
pub struct BundleFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Everything a publication writes into a repository, read into memory.
#[derive(Debug, Clone)]
pub struct PublicationBundle {
    pub module: ModuleId,
    pub version: String,
    pub snapshot: bool,
    pub files: Vec<BundleFile>,
}

/// What a publish run wrote.
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Directory or base URL of the version that was written.
    pub location: String,
    /// Repository-relative paths, sidecars included.
    pub files: Vec<String>,
}

impl PublicationBundle {
    /// Read the attached artifacts and pair them with the generated POM.
    ///
    /// Fails listing every attached file that does not exist.
    pub fn assemble(descriptor: &PublicationDescriptor, pom_xml: String) -> miette::Result<Self> {
        let missing: Vec<String> = descriptor
            .missing_files()
            .iter()
            .map(|a| a.file.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(KompoError::Publish {
                message: format!("missing artifact files: {}", missing.join(", ")),
            }
            .into());
        }

        let mut files = Vec::with_capacity(descriptor.artifacts.len() + 1);
        for artifact in &descriptor.artifacts {
            let data = std::fs::read(&artifact.file).map_err(KompoError::Io)?;
            files.push(BundleFile {
                name: descriptor.repository_file_name(artifact),
                data,
            });
        }
        files.push(BundleFile {
            name: descriptor.pom_file_name(),
            data: pom_xml.into_bytes(),
        });

        Ok(Self {
            module: ModuleId::new(&descriptor.group_id, &descriptor.artifact_id),
            version: descriptor.version.clone(),
            snapshot: descriptor.is_snapshot(),
            files,
        })
    }

    /// `org/solverslib/core/1.0.0`
    pub fn version_path(&self) -> String {
        MavenRepository::version_path(&self.module, &self.version)
    }
}

/// Repository-relative paths a publication would write, without sidecars
/// and metadata. Used for `--dry-run`.
pub fn planned_paths(descriptor: &PublicationDescriptor) -> Vec<String> {
    let module = ModuleId::new(&descriptor.group_id, &descriptor.artifact_id);
    let base = MavenRepository::version_path(&module, &descriptor.version);
    descriptor
        .artifacts
        .iter()
        .map(|a| descriptor.repository_file_name(a))
        .chain(std::iter::once(descriptor.pom_file_name()))
        .map(|name| format!("{base}/{name}"))
        .collect()
}

/// Publish into a file repository rooted at `root`.
///
/// An existing release version is only overwritten with `force`;
/// SNAPSHOT versions are always overwritten.
pub fn publish_to_directory(
    root: &Path,
    bundle: &PublicationBundle,
    force: bool,
) -> miette::Result<PublishReport> {
    let version_dir = root.join(bundle.version_path());
    let pom_name = format!("{}-{}.pom", bundle.module.artifact, bundle.version);
    if version_dir.join(&pom_name).is_file() && !bundle.snapshot && !force {
        return Err(KompoError::Publish {
            message: format!(
                "{}:{} already exists in {} (use --force to overwrite)",
                bundle.module,
                bundle.version,
                root.display()
            ),
        }
        .into());
    }

    let mut written = Vec::new();
    for file in &bundle.files {
        write_with_sidecars(&version_dir, &file.name, &file.data, &mut written)?;
    }

    let module_dir = root.join(MavenRepository::module_path(&bundle.module));
    let (mut meta, present) = read_module_metadata(&module_dir, &bundle.module)?;
    meta.add_version(&bundle.version);
    let xml = meta.to_xml()?;
    // maven-metadata.xml is always written; the -local variant only when
    // Maven or Gradle already keep one there.
    for name in metadata::LOCAL_METADATA_FILES {
        if name == "maven-metadata.xml" || present.contains(&name) {
            write_with_sidecars(&module_dir, name, xml.as_bytes(), &mut written)?;
        }
    }

    let files = written
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or(p)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    tracing::info!("published {}:{} to {}", bundle.module, bundle.version, root.display());
    Ok(PublishReport {
        location: version_dir.display().to_string(),
        files,
    })
}

/// Merged metadata of a module in a file repository, or fresh metadata,
/// along with the names of the metadata files that exist.
fn read_module_metadata(
    dir: &Path,
    module: &ModuleId,
) -> miette::Result<(MavenMetadata, Vec<&'static str>)> {
    let mut present = Vec::new();
    let mut documents = Vec::new();
    for name in metadata::LOCAL_METADATA_FILES {
        let path = dir.join(name);
        if path.is_file() {
            documents.push(std::fs::read_to_string(&path).map_err(KompoError::Io)?);
            present.push(name);
        }
    }
    let meta = metadata::merge_documents(module, &documents)?
        .unwrap_or_else(|| MavenMetadata::for_module(module));
    Ok((meta, present))
}

fn write_with_sidecars(
    dir: &Path,
    name: &str,
    data: &[u8],
    written: &mut Vec<PathBuf>,
) -> miette::Result<()> {
    let path = dir.join(name);
    kompo_util::fs::write_atomic(&path, data).map_err(KompoError::Io)?;
    written.push(path);
    for (sidecar, digest) in checksum::sidecar_files(name, data) {
        let path = dir.join(sidecar);
        kompo_util::fs::write_atomic(&path, digest.as_bytes()).map_err(KompoError::Io)?;
        written.push(path);
    }
    Ok(())
}

/// Publish to a remote repository with `PUT` requests.
pub async fn publish_to_http(
    client: &Client,
    repo: &MavenRepository,
    bundle: &PublicationBundle,
) -> miette::Result<PublishReport> {
    let base = format!("{}/{}", repo.url, bundle.version_path());
    let mut uploaded = Vec::new();

    for file in &bundle.files {
        let path = format!("{}/{}", bundle.version_path(), file.name);
        upload_with_sidecars(client, repo, &path, &file.name, &file.data, &mut uploaded).await?;
    }

    let metadata_url = repo.metadata_url(&bundle.module);
    let mut meta = match download::download_text(client, repo, &metadata_url).await? {
        Some(xml) => metadata::parse_metadata(&xml)?,
        None => MavenMetadata::for_module(&bundle.module),
    };
    meta.add_version(&bundle.version);
    let path = format!(
        "{}/maven-metadata.xml",
        MavenRepository::module_path(&bundle.module)
    );
    upload_with_sidecars(
        client,
        repo,
        &path,
        "maven-metadata.xml",
        meta.to_xml()?.as_bytes(),
        &mut uploaded,
    )
    .await?;

    tracing::info!("published {}:{} to {}", bundle.module, bundle.version, repo.url);
    Ok(PublishReport {
        location: base,
        files: uploaded,
    })
}

async fn upload_with_sidecars(
    client: &Client,
    repo: &MavenRepository,
    path: &str,
    name: &str,
    data: &[u8],
    uploaded: &mut Vec<String>,
) -> miette::Result<()> {
    download::upload(client, repo, &format!("{}/{path}", repo.url), data.to_vec()).await?;
    uploaded.push(path.to_string());
    let dir = path.strip_suffix(name).unwrap_or(path);
    for (sidecar, digest) in checksum::sidecar_files(name, data) {
        let sidecar_path = format!("{dir}{sidecar}");
        download::upload(
            client,
            repo,
            &format!("{}/{sidecar_path}", repo.url),
            digest.into_bytes(),
        )
        .await?;
        uploaded.push(sidecar_path);
    }
    Ok(())
}
