//! Handler for `kompo resolve`.

use std::path::Path;

use miette::Result;

use kompo_ops::ops_resolve::{self, ResolveOptions};

pub async fn exec(manifest_path: &Path, json: bool, offline: bool) -> Result<()> {
    let opts = ResolveOptions { json, offline };
    ops_resolve::resolve(manifest_path, &opts).await
}
