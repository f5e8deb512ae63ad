//! Shared utilities for kompo.
//!
//! Cross-cutting concerns used by every other kompo crate: the unified error
//! type, filesystem helpers, artifact digests, git tag lookup and Cargo-style
//! status output.

pub mod errors;
pub mod fs;
pub mod git;
pub mod hash;
pub mod progress;
