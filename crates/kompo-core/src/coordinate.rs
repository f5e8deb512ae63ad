//! Maven coordinates and the version-less module identity used for matching.

use std::fmt;

/// `group:artifact`, the part of a coordinate that substitution rules match on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub group: String,
    pub artifact: String,
}

impl ModuleId {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parse `"group:artifact"`. Both segments must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (group, artifact) = s.split_once(':')?;
        if group.is_empty() || artifact.is_empty() || artifact.contains(':') {
            return None;
        }
        Some(Self::new(group, artifact))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// A requested or published Maven coordinate. The version is optional on
/// requests: `org.solverslib:core` is a valid dependency when an included
/// build provides it, or when a repository lists versions in its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub module: ModuleId,
    pub version: Option<String>,
}

impl Coordinate {
    pub fn new(group: &str, artifact: &str, version: Option<&str>) -> Self {
        Self {
            module: ModuleId::new(group, artifact),
            version: version.map(str::to_string),
        }
    }

    /// Parse `"group:artifact"` or `"group:artifact:version"`.
    ///
    /// Empty segments and more than three segments are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [group, artifact] => Some(Self::new(group, artifact, None)),
            [group, artifact, version] => Some(Self::new(group, artifact, Some(version))),
            _ => None,
        }
    }

    pub fn group(&self) -> &str {
        &self.module.group
    }

    pub fn artifact(&self) -> &str {
        &self.module.artifact
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The same module pinned to a concrete version.
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            module: self.module.clone(),
            version: Some(version.to_string()),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{v}", self.module),
            None => write!(f, "{}", self.module),
        }
    }
}
