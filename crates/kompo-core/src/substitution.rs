//! Substitution rules: build-wide redirects from a published module to a
//! local project.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use kompo_util::errors::KompoError;

use crate::coordinate::{Coordinate, ModuleId};

/// A project inside an included build whose output can replace a published
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalProject {
    /// Name of the included build (`core` for `includeBuild("../core")`).
    pub build: String,
    /// Project path inside the included build; `:` is its root project.
    pub project_path: String,
    /// Directory holding the project's sources.
    pub dir: PathBuf,
}

impl LocalProject {
    /// Build-wide identity: `:core` for the root project of build `core`,
    /// `:core:lib` for its `:lib` subproject.
    pub fn build_path(&self) -> String {
        match self.project_path.trim_start_matches(':') {
            "" => format!(":{}", self.build),
            sub => format!(":{}:{sub}", self.build),
        }
    }
}

impl fmt::Display for LocalProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build_path())
    }
}

/// One redirect: requests for `module` are served by `project`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub module: ModuleId,
    pub project: LocalProject,
}

/// The immutable rule set of a build, fixed before any resolution starts.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionRules {
    rules: Vec<SubstitutionRule>,
    index: HashMap<ModuleId, usize>,
}

impl SubstitutionRules {
    /// Validate and freeze a rule list.
    ///
    /// Fails with [`KompoError::DuplicateCoordinate`] when two rules target
    /// the same `group:artifact`, even if they point at the same project.
    pub fn new(rules: Vec<SubstitutionRule>) -> miette::Result<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            if let Some(&prev) = index.get(&rule.module) {
                let first: &SubstitutionRule = &rules[prev];
                return Err(KompoError::DuplicateCoordinate {
                    coordinate: rule.module.to_string(),
                    first: first.project.build_path(),
                    second: rule.project.build_path(),
                }
                .into());
            }
            index.insert(rule.module.clone(), i);
        }
        Ok(Self { rules, index })
    }

    /// The local project substituting `coordinate`, matching on group and
    /// artifact only.
    pub fn lookup(&self, coordinate: &Coordinate) -> Option<&LocalProject> {
        self.index
            .get(&coordinate.module)
            .map(|&i| &self.rules[i].project)
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
