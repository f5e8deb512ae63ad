use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all kompo operations.
#[derive(Debug, Error, Diagnostic)]
pub enum KompoError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Kompo.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Kompo.toml for syntax errors"))]
    Manifest { message: String },

    /// A requested coordinate matched no substitution rule and no repository served it.
    #[error(
        "Could not resolve {coordinate}: no substitution rule matched and no repository serves it (searched: {})",
        searched_list(.searched)
    )]
    #[diagnostic(
        code(kompo::coordinate_not_found),
        help("Declare a repository that publishes this artifact, or include the build that produces it")
    )]
    CoordinateNotFound {
        coordinate: String,
        searched: Vec<String>,
    },

    /// Two substitution rules claim the same `group:artifact`.
    #[error("Coordinate {coordinate} is substituted by both {first} and {second}")]
    #[diagnostic(
        code(kompo::duplicate_coordinate),
        help("Each coordinate may be redirected to at most one local project")
    )]
    DuplicateCoordinate {
        coordinate: String,
        first: String,
        second: String,
    },

    /// Local project builds depend on each other in a cycle.
    #[error("Build cycle detected involving {project}")]
    BuildCycle { project: String },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Composing or writing a publication failed.
    #[error("Publishing failed: {message}")]
    Publish { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

fn searched_list(searched: &[String]) -> String {
    if searched.is_empty() {
        "no repositories declared".to_string()
    } else {
        searched.join(", ")
    }
}
