//! Maven repository protocol: repository layout, version metadata,
//! existence probes, POM generation, checksums and publishing.

pub mod auth;
pub mod checksum;
pub mod download;
pub mod metadata;
pub mod pom;
pub mod publish;
pub mod repository;
pub mod source;
