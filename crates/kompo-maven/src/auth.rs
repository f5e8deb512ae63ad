//! Repository authentication.
//!
//! Credentials come from the repository entry in `Kompo.toml` (usually
//! `${env:...}` references resolved against `.kompo.env`) or, when the
//! manifest has none, from `[credentials.<repo>]` in the global config:
//!
//! ```toml
//! [[repositories]]
//! name = "brott"
//! url = "https://maven.brott.dev/"
//! username = "${env:BROTT_USER}"
//! password = "${env:BROTT_TOKEN}"
//! ```

use reqwest::RequestBuilder;

use crate::repository::MavenRepository;

/// Apply authentication to a request if the repository has credentials.
///
/// A password without a username is sent as a bearer token.
pub fn apply_auth(request: RequestBuilder, repo: &MavenRepository) -> RequestBuilder {
    match (&repo.username, &repo.password) {
        (Some(user), Some(pass)) => request.basic_auth(user, Some(pass)),
        (Some(user), None) => request.basic_auth(user, None::<&str>),
        (None, Some(token)) => request.bearer_auth(token),
        (None, None) => request,
    }
}
