use serde::{Deserialize, Serialize};

use crate::coordinate::{Coordinate, ModuleId};

/// A dependency specification in Kompo.toml.
///
/// Supports both shorthand (`"group:artifact[:version]"`) and detailed forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Short(String),
    Detailed(DetailedDependency),
}

/// A dependency with explicit group, artifact, optional version and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedDependency {
    pub group: String,
    pub artifact: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub exclude: Vec<Exclusion>,
}

/// A transitive dependency to exclude, as in Gradle's
/// `exclude(group = "org.ejml", module = "ejml-all")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub group: String,
    #[serde(default)]
    pub module: Option<String>,
}

/// The Gradle configuration a dependency is declared in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Configuration {
    Api,
    #[default]
    Implementation,
    CompileOnly,
    RuntimeOnly,
    TestImplementation,
}

impl Configuration {
    /// Maven scope written to the published POM, or `None` when the
    /// dependency is not part of the published artifact's contract.
    pub fn pom_scope(self) -> Option<&'static str> {
        match self {
            Self::Api => Some("compile"),
            Self::Implementation | Self::RuntimeOnly => Some("runtime"),
            Self::CompileOnly | Self::TestImplementation => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Implementation => "implementation",
            Self::CompileOnly => "compile-only",
            Self::RuntimeOnly => "runtime-only",
            Self::TestImplementation => "test-implementation",
        }
    }
}

/// A dependency declaration with its coordinate already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    /// Key of the entry in `[dependencies]`.
    pub name: String,
    pub coordinate: Coordinate,
    pub configuration: Configuration,
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    /// Parse this entry into a [`DependencyDecl`].
    ///
    /// Returns `None` when the shorthand is not a valid coordinate.
    pub fn to_decl(&self, name: &str) -> Option<DependencyDecl> {
        match self {
            Dependency::Short(s) => Some(DependencyDecl {
                name: name.to_string(),
                coordinate: Coordinate::parse(s)?,
                configuration: Configuration::default(),
                exclusions: Vec::new(),
            }),
            Dependency::Detailed(d) => {
                if d.group.is_empty() || d.artifact.is_empty() {
                    return None;
                }
                Some(DependencyDecl {
                    name: name.to_string(),
                    coordinate: Coordinate {
                        module: ModuleId::new(&d.group, &d.artifact),
                        version: d.version.clone().filter(|v| !v.is_empty()),
                    },
                    configuration: d.configuration,
                    exclusions: d.exclude.clone(),
                })
            }
        }
    }
}
