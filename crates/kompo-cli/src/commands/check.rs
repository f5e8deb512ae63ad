//! Check command implementation.

use std::path::Path;

use miette::Result;

pub fn exec(manifest_path: &Path, verbose: bool) -> Result<()> {
    kompo_ops::ops_check::check(manifest_path, verbose)
}
