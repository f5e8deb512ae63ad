//! Operation: publish the root project's publication to a Maven repository.

use std::path::Path;

use kompo_core::composite::CompositeBuild;
use kompo_core::publication::PublicationDescriptor;
use kompo_maven::pom::{self, PomDependency};
use kompo_maven::publish::{self, PublicationBundle, PublishReport};
use kompo_maven::repository::MavenRepository;
use kompo_maven::download;
use kompo_util::errors::KompoError;
use kompo_util::progress::{status, status_info, status_warn};

use crate::ops_setup::Context;

/// Options for `kompo publish`.
#[derive(Debug, Default)]
pub struct PublishOptions {
    /// Named repository from the manifest; `None` publishes to the local
    /// repository from the global config.
    pub repository: Option<String>,
    /// Print what would be written without reading or writing files.
    pub dry_run: bool,
    /// Overwrite an existing release version in a file repository.
    pub force: bool,
}

pub async fn publish(manifest_path: &Path, opts: &PublishOptions) -> miette::Result<()> {
    let ctx = Context::load(manifest_path)?;
    let descriptor = PublicationDescriptor::compose(ctx.manifest(), &ctx.composite.root_dir)?;
    let target = publish_target(&ctx, opts.repository.as_deref())?;
    let dependencies = pom_dependencies(&ctx.composite)?;
    let pom_xml = pom::generate_pom(&descriptor, &dependencies)?;

    let coordinate = format!(
        "{}:{}:{}",
        descriptor.group_id, descriptor.artifact_id, descriptor.version
    );

    if opts.dry_run {
        status_info("Publishing", &format!("{coordinate} to {} (dry run)", target.describe()));
        for path in publish::planned_paths(&descriptor) {
            println!("{path}");
        }
        for missing in descriptor.missing_files() {
            status_warn("Missing", &missing.file.display().to_string());
        }
        return Ok(());
    }

    status("Publishing", &format!("{coordinate} to {}", target.describe()));
    for missing in descriptor.missing_files() {
        status_warn("Missing", &missing.file.display().to_string());
    }
    let bundle = PublicationBundle::assemble(&descriptor, pom_xml)?;
    let report: PublishReport = match target.local_dir() {
        Some(dir) => publish::publish_to_directory(&dir, &bundle, opts.force)?,
        None => {
            if opts.force {
                tracing::debug!("--force has no effect on remote repositories");
            }
            let client = download::build_client()?;
            publish::publish_to_http(&client, &target, &bundle).await?
        }
    };

    status(
        "Published",
        &format!("{coordinate} ({} files) to {}", report.files.len(), report.location),
    );
    Ok(())
}

/// The repository a publication goes to.
fn publish_target(ctx: &Context, name: Option<&str>) -> miette::Result<MavenRepository> {
    match name {
        Some(name) => ctx
            .repositories
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| {
                let known: Vec<&str> = ctx.repositories.iter().map(|r| r.name.as_str()).collect();
                KompoError::Publish {
                    message: format!(
                        "no repository named '{name}' (declared: {})",
                        if known.is_empty() {
                            "none".to_string()
                        } else {
                            known.join(", ")
                        }
                    ),
                }
                .into()
            }),
        None => {
            let dir = kompo_util::fs::expand_home(&ctx.config.publish.local_repository);
            Ok(MavenRepository::directory("maven-local", &dir))
        }
    }
}

/// POM dependencies of the root project. Substituted dependencies are
/// written under their published coordinate at the local project's version.
pub fn pom_dependencies(composite: &CompositeBuild) -> miette::Result<Vec<PomDependency>> {
    let mut deps = Vec::new();
    for decl in composite.manifest.dependency_decls()? {
        let local_version = match composite.rules.lookup(&decl.coordinate) {
            Some(project) => {
                let version = composite.local_version(project)?;
                if version.is_none() && decl.coordinate.version().is_none() {
                    return Err(KompoError::Publish {
                        message: format!(
                            "{} is substituted by project {project}, which declares no version",
                            decl.coordinate
                        ),
                    }
                    .into());
                }
                version
            }
            None => None,
        };
        if let Some(dep) = PomDependency::from_decl(&decl, local_version) {
            deps.push(dep);
        }
    }
    Ok(deps)
}
