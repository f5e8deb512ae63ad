//! Operation: resolve every declared dependency and report where it comes from.

use std::path::Path;

use kompo_resolver::resolver::{Resolvable, ResolutionRecord};
use kompo_util::errors::KompoError;
use kompo_util::progress::{status, status_info, status_warn};

use crate::ops_setup::{Context, Outcome};

/// Options for `kompo resolve`.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Print JSON instead of status lines.
    pub json: bool,
    /// Skip remote repositories.
    pub offline: bool,
}

/// Resolve the root project's dependencies.
///
/// Every dependency is attempted; the first failure is returned after all
/// results have been reported.
pub async fn resolve(manifest_path: &Path, opts: &ResolveOptions) -> miette::Result<()> {
    let ctx = Context::load(manifest_path)?;
    let offline = ctx.offline(opts.offline);
    let outcomes = ctx.resolve_declared(offline).await?;

    if opts.json {
        print_json(&outcomes)?;
    } else {
        print_status(&ctx, &outcomes, offline);
    }

    match outcomes.into_iter().find_map(|o| o.result.err()) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn print_status(ctx: &Context, outcomes: &[Outcome], offline: bool) {
    if offline {
        status_info("Offline", "remote repositories are skipped");
    }
    let mut local = 0usize;
    let mut published = 0usize;
    for outcome in outcomes {
        match &outcome.result {
            Ok(resolution) => match &resolution.target {
                Resolvable::LocalBuildOutput { project } => {
                    local += 1;
                    status(
                        "Substituted",
                        &format!("{} with project {project}", resolution.requested),
                    );
                }
                Resolvable::PublishedArtifact {
                    coordinate,
                    repository,
                } => {
                    published += 1;
                    status("Resolved", &format!("{coordinate} from {repository}"));
                }
            },
            Err(_) => status_warn("Unresolved", &outcome.decl.coordinate.to_string()),
        }
    }
    status_info(
        "Finished",
        &format!(
            "{} dependencies of {} ({local} local, {published} published)",
            outcomes.len(),
            ctx.project_name()
        ),
    );
}

fn print_json(outcomes: &[Outcome]) -> miette::Result<()> {
    let records: Vec<ResolutionRecord> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .map(ResolutionRecord::from)
        .collect();
    let json = serde_json::to_string_pretty(&records).map_err(|e| KompoError::Generic {
        message: format!("Failed to serialize resolution: {e}"),
    })?;
    println!("{json}");
    Ok(())
}
