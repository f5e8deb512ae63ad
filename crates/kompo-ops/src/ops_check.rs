//! Operation: validate the composite build without touching the network.
//!
//! Loads every manifest, freezes the substitution rules (rejecting
//! duplicates), expands repository entries, checks dependency
//! coordinates, orders the local builds, and composes the publication.

use std::path::Path;

use kompo_core::publication::PublicationDescriptor;
use kompo_resolver::resolver::{Resolution, Resolvable};
use kompo_util::progress::{status, status_warn};

use crate::ops_setup::{Context, Outcome};

/// Validate the build rooted at `manifest_path`.
pub fn check(manifest_path: &Path, verbose: bool) -> miette::Result<()> {
    let ctx = Context::load(manifest_path)?;
    let decls = ctx.manifest().dependency_decls()?;

    if verbose {
        for rule in ctx.composite.rules.iter() {
            status("Substitute", &format!("{} with project {}", rule.module, rule.project));
        }
        for repo in &ctx.repositories {
            status("Repository", &repo.describe());
        }
    }

    // Substituted dependencies are enough to order the local builds.
    let local: Vec<Outcome> = decls
        .into_iter()
        .filter_map(|decl| {
            let project = ctx.composite.rules.lookup(&decl.coordinate)?.clone();
            let requested = decl.coordinate.clone();
            Some(Outcome {
                decl,
                result: Ok(Resolution {
                    requested,
                    target: Resolvable::LocalBuildOutput { project },
                }),
            })
        })
        .collect();
    let graph = ctx.build_graph(&local);
    let order = graph.build_order()?;

    if ctx.manifest().publication.is_some() {
        let descriptor = PublicationDescriptor::compose(ctx.manifest(), &ctx.composite.root_dir)?;
        for missing in descriptor.missing_files() {
            status_warn(
                "Missing",
                &format!("{} (not built yet)", missing.file.display()),
            );
        }
    }

    status(
        "Checked",
        &format!(
            "{}: {} substitution rules, {} repositories, {} local builds",
            ctx.project_name(),
            ctx.composite.rules.len(),
            ctx.repositories.len(),
            order.len()
        ),
    );
    Ok(())
}
