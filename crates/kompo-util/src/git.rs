//! Release tags read through the `git` command line.

use std::path::Path;
use std::process::Command;

use crate::errors::KompoError;

/// The tag nearest to `HEAD` and how far `HEAD` has moved past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescription {
    pub tag: String,
    pub commits_since: u32,
}

impl TagDescription {
    /// Parse `git describe --tags --long` output: `v2.1.1-3-g1a2b3c4`.
    pub fn parse(described: &str) -> Option<Self> {
        let mut parts = described.trim().rsplitn(3, '-');
        let hash = parts.next()?;
        let commits_since = parts.next()?.parse().ok()?;
        let tag = parts.next()?;
        if !hash.starts_with('g') || tag.is_empty() {
            return None;
        }
        Some(Self {
            tag: tag.to_string(),
            commits_since,
        })
    }
}

/// Describe `HEAD` of the repository containing `dir` by its nearest tag.
pub fn describe_nearest_tag(dir: &Path) -> miette::Result<TagDescription> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--long"])
        .current_dir(dir)
        .output()
        .map_err(|e| KompoError::Generic {
            message: format!("failed to run git in {}: {e}", dir.display()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KompoError::Generic {
            message: format!(
                "no release tag reachable from HEAD in {}: {}",
                dir.display(),
                stderr.trim()
            ),
        }
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    TagDescription::parse(&stdout).ok_or_else(|| {
        KompoError::Generic {
            message: format!("unexpected `git describe` output: {}", stdout.trim()),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_describe_output() {
        assert_eq!(
            TagDescription::parse("v2.1.1-0-g1a2b3c4\n"),
            Some(TagDescription {
                tag: "v2.1.1".to_string(),
                commits_since: 0
            })
        );
        // Tags may contain dashes themselves.
        assert_eq!(
            TagDescription::parse("2.2.0-rc1-4-gdeadbee").map(|d| (d.tag, d.commits_since)),
            Some(("2.2.0-rc1".to_string(), 4))
        );
    }

    #[test]
    fn rejects_short_output() {
        assert_eq!(TagDescription::parse("v2.1.1"), None);
        assert_eq!(TagDescription::parse("1a2b3c4"), None);
    }
}
