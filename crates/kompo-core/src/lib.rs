//! Core data types for kompo.
//!
//! Coordinates, the `Kompo.toml` manifest, substitution rules, composite
//! build loading, publication descriptors, global configuration and
//! `.kompo.env` interpolation.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod composite;
pub mod config;
pub mod coordinate;
pub mod dependency;
pub mod manifest;
pub mod properties;
pub mod publication;
pub mod substitution;
