use kompo_util::hash::{digest_bytes, digest_file, sha256_bytes};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_digest_bytes_hello() {
    let d = digest_bytes(b"hello");
    assert_eq!(d.md5, "5d41402abc4b2a76b9719d911017c592");
    assert_eq!(d.sha1, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    assert_eq!(
        d.sha256,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(d.sha512.len(), 128);
}

#[test]
fn test_sha256_bytes_empty() {
    assert_eq!(
        sha256_bytes(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_digest_file_matches_bytes() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"hello").unwrap();
    tmp.flush().unwrap();
    assert_eq!(digest_file(tmp.path()).unwrap(), digest_bytes(b"hello"));
}

#[test]
fn test_sidecar_order() {
    let d = digest_bytes(b"");
    let exts: Vec<&str> = d.sidecars().iter().map(|(ext, _)| *ext).collect();
    assert_eq!(exts, ["md5", "sha1", "sha256", "sha512"]);
}

#[test]
fn test_digest_file_not_found() {
    assert!(digest_file(Path::new("/nonexistent/path/file.jar")).is_err());
}
