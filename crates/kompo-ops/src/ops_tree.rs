//! Operation: display the build graph as a tree.

use std::path::Path;

use kompo_util::progress::status_warn;

use crate::ops_setup::Context;

/// Options for `kompo tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Print the order local builds run in instead of the tree.
    pub order: bool,
    pub offline: bool,
}

/// Print the root project, the local builds substituted into it and the
/// artifacts it fetches.
pub async fn tree(manifest_path: &Path, opts: &TreeOptions) -> miette::Result<()> {
    let ctx = Context::load(manifest_path)?;
    let offline = ctx.offline(opts.offline);
    let outcomes = ctx.resolve_declared(offline).await?;
    let graph = ctx.build_graph(&outcomes);

    if opts.order {
        let order = graph.build_order()?;
        if order.is_empty() {
            println!("No local builds.");
        }
        for (i, project) in order.iter().enumerate() {
            println!("{}. {project} ({})", i + 1, project.dir.display());
        }
        println!("{}. {}", order.len() + 1, ctx.project_name());
    } else {
        print!("{}", graph.print_tree());
    }

    let mut first_err = None;
    for outcome in outcomes {
        if let Err(e) = outcome.result {
            status_warn("Unresolved", &outcome.decl.coordinate.to_string());
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
