//! Handler for `kompo publish`.

use std::path::Path;

use miette::Result;

use kompo_ops::ops_publish::{self, PublishOptions};
use kompo_util::progress::status_info;

pub async fn exec(
    manifest_path: &Path,
    repository: Option<String>,
    dry_run: bool,
    force: bool,
) -> Result<()> {
    if force && dry_run {
        status_info("Note", "--force has no effect with --dry-run");
    }
    let opts = PublishOptions {
        repository,
        dry_run,
        force,
    };
    ops_publish::publish(manifest_path, &opts).await
}
