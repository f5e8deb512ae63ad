//! Checksum sidecars: verification of downloaded files and generation of
//! `.md5`/`.sha1`/`.sha256`/`.sha512` files for publishing.

use std::path::Path;

use reqwest::Client;

use kompo_util::errors::KompoError;
use kompo_util::hash::{self, Digests};

use crate::download;
use crate::repository::MavenRepository;

/// Verify downloaded data against the sidecar files next to it.
///
/// Tries SHA-256 first, falls back to SHA-1, then MD5. Files without any
/// sidecar are accepted.
pub async fn verify(
    client: &Client,
    repo: &MavenRepository,
    file_url: &str,
    data: &[u8],
) -> miette::Result<()> {
    let actual = hash::digest_bytes(data);

    for (ext, algo) in [("sha256", "SHA-256"), ("sha1", "SHA-1"), ("md5", "MD5")] {
        let sidecar = format!("{file_url}.{ext}");
        if let Some(expected) = download::download_text(client, repo, &sidecar).await? {
            return check(digest_for(&actual, ext), &extract_hash(&expected), algo, file_url);
        }
    }

    tracing::debug!("No checksum sidecar found for {file_url}");
    Ok(())
}

/// Verify a file read from a file repository against its sidecars on disk.
pub async fn verify_file(path: &Path, data: &[u8]) -> miette::Result<()> {
    let actual = hash::digest_bytes(data);
    let shown = path.display().to_string();

    for (ext, algo) in [("sha256", "SHA-256"), ("sha1", "SHA-1"), ("md5", "MD5")] {
        let mut sidecar = path.as_os_str().to_os_string();
        sidecar.push(format!(".{ext}"));
        match tokio::fs::read_to_string(&sidecar).await {
            Ok(expected) => {
                return check(digest_for(&actual, ext), &extract_hash(&expected), algo, &shown)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(KompoError::Io(e).into()),
        }
    }
    Ok(())
}

fn digest_for<'a>(digests: &'a Digests, ext: &str) -> &'a str {
    digests
        .sidecars()
        .into_iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, d)| d)
        .unwrap_or_default()
}

fn check(actual: &str, expected: &str, algo: &str, url: &str) -> miette::Result<()> {
    if actual.eq_ignore_ascii_case(expected) {
        tracing::debug!("{algo} ok for {url}");
        Ok(())
    } else {
        Err(KompoError::Network {
            message: format!("{algo} mismatch for {url}: expected {expected}, got {actual}"),
        }
        .into())
    }
}

/// Extract the hex hash from a checksum file.
///
/// Maven checksum files may contain just the hash, or `hash  filename`.
pub fn extract_hash(content: &str) -> String {
    content.split_whitespace().next().unwrap_or("").to_string()
}

/// Sidecar files for a published file: `(file name, contents)` pairs.
pub fn sidecar_files(file_name: &str, data: &[u8]) -> Vec<(String, String)> {
    hash::digest_bytes(data)
        .sidecars()
        .into_iter()
        .map(|(ext, digest)| (format!("{file_name}.{ext}"), digest.to_string()))
        .collect()
}
