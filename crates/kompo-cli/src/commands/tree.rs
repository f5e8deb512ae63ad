//! Handler for `kompo tree`.

use std::path::Path;

use miette::Result;

use kompo_ops::ops_tree::{self, TreeOptions};

pub async fn exec(manifest_path: &Path, order: bool, offline: bool) -> Result<()> {
    let opts = TreeOptions { order, offline };
    ops_tree::tree(manifest_path, &opts).await
}
