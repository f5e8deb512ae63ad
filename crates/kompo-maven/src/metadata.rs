//! maven-metadata.xml: parsing for version discovery and SNAPSHOT probes,
//! rendering and merging for publishing.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use kompo_core::coordinate::ModuleId;
use kompo_util::errors::KompoError;

/// Metadata file names a file repository may hold per module. Gradle's
/// `publishToMavenLocal` and `mvn install` write the second one.
pub const LOCAL_METADATA_FILES: [&str; 2] = ["maven-metadata.xml", "maven-metadata-local.xml"];

/// Merge the metadata documents found in one module directory.
///
/// `None` when there are none.
pub fn merge_documents(
    module: &ModuleId,
    documents: &[String],
) -> miette::Result<Option<MavenMetadata>> {
    if documents.is_empty() {
        return Ok(None);
    }
    let mut merged = MavenMetadata::for_module(module);
    for xml in documents {
        merged.merge(&parse_metadata(xml)?);
    }
    Ok(Some(merged))
}

/// Artifact-level Maven metadata listing available versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
    pub last_updated: Option<String>,
}

impl MavenMetadata {
    /// Empty metadata for a module that has never been published.
    pub fn for_module(module: &ModuleId) -> Self {
        Self {
            group_id: Some(module.group.clone()),
            artifact_id: Some(module.artifact.clone()),
            ..Default::default()
        }
    }

    /// Every version the metadata mentions. Some repositories only fill in
    /// `latest`/`release`.
    pub fn all_versions(&self) -> Vec<String> {
        let mut all = self.versions.clone();
        for v in [&self.release, &self.latest].into_iter().flatten() {
            if !all.contains(v) {
                all.push(v.clone());
            }
        }
        all
    }

    /// Record a newly published version: appended if absent, becomes
    /// `latest`, and `release` unless it is a SNAPSHOT. `lastUpdated` is
    /// set to the current UTC time.
    pub fn add_version(&mut self, version: &str) {
        if !self.versions.iter().any(|v| v == version) {
            self.versions.push(version.to_string());
        }
        self.latest = Some(version.to_string());
        if !version.ends_with("-SNAPSHOT") {
            self.release = Some(version.to_string());
        }
        self.last_updated = Some(chrono::Utc::now().format("%Y%m%d%H%M%S").to_string());
    }

    /// Fold another metadata document for the same module into this one.
    /// Versions keep first-seen order; `latest`/`release` are taken from
    /// `other` only where this document has none.
    pub fn merge(&mut self, other: &MavenMetadata) {
        for v in other.all_versions() {
            if !self.versions.contains(&v) {
                self.versions.push(v);
            }
        }
        if self.group_id.is_none() {
            self.group_id = other.group_id.clone();
        }
        if self.artifact_id.is_none() {
            self.artifact_id = other.artifact_id.clone();
        }
        if self.latest.is_none() {
            self.latest = other.latest.clone();
        }
        if self.release.is_none() {
            self.release = other.release.clone();
        }
        if other.last_updated > self.last_updated {
            self.last_updated = other.last_updated.clone();
        }
    }

    /// Render as a `maven-metadata.xml` document.
    pub fn to_xml(&self) -> miette::Result<String> {
        render_metadata(self).map_err(|e| {
            KompoError::Generic {
                message: format!("Failed to write maven-metadata.xml: {e}"),
            }
            .into()
        })
    }
}

fn render_metadata(meta: &MavenMetadata) -> io::Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    open(&mut w, "metadata")?;
    text_element(&mut w, "groupId", meta.group_id.as_deref())?;
    text_element(&mut w, "artifactId", meta.artifact_id.as_deref())?;
    open(&mut w, "versioning")?;
    text_element(&mut w, "latest", meta.latest.as_deref())?;
    text_element(&mut w, "release", meta.release.as_deref())?;
    open(&mut w, "versions")?;
    for v in &meta.versions {
        text_element(&mut w, "version", Some(v))?;
    }
    close(&mut w, "versions")?;
    text_element(&mut w, "lastUpdated", meta.last_updated.as_deref())?;
    close(&mut w, "versioning")?;
    close(&mut w, "metadata")?;
    let mut xml = String::from_utf8_lossy(&w.into_inner()).to_string();
    xml.push('\n');
    Ok(xml)
}

pub(crate) fn emit<W: io::Write>(w: &mut Writer<W>, event: Event<'_>) -> io::Result<()> {
    w.write_event(event).map_err(io::Error::other)
}

pub(crate) fn open<W: io::Write>(w: &mut Writer<W>, name: &str) -> io::Result<()> {
    emit(w, Event::Start(BytesStart::new(name)))
}

pub(crate) fn close<W: io::Write>(w: &mut Writer<W>, name: &str) -> io::Result<()> {
    emit(w, Event::End(BytesEnd::new(name)))
}

/// `<name>text</name>`; nothing when `text` is `None`.
pub(crate) fn text_element<W: io::Write>(
    w: &mut Writer<W>,
    name: &str,
    text: Option<&str>,
) -> io::Result<()> {
    let Some(text) = text else {
        return Ok(());
    };
    open(w, name)?;
    emit(w, Event::Text(BytesText::new(text)))?;
    close(w, name)
}

/// Version-level snapshot metadata for timestamped SNAPSHOT resolution.
#[derive(Debug, Clone, Default)]
pub struct SnapshotMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub timestamp: Option<String>,
    pub build_number: Option<u32>,
    pub last_updated: Option<String>,
}

impl SnapshotMetadata {
    /// Build a timestamped snapshot filename.
    ///
    /// For version `1.0-SNAPSHOT` with timestamp `20240101.120000` and build `5`,
    /// returns `artifactId-1.0-20240101.120000-5`.
    pub fn snapshot_base(&self, artifact_id: &str) -> Option<String> {
        let version = self.version.as_deref()?;
        let base = version.strip_suffix("-SNAPSHOT")?;
        let ts = self.timestamp.as_deref()?;
        let bn = self.build_number?;
        Some(format!("{artifact_id}-{base}-{ts}-{bn}"))
    }
}

/// Parse an artifact-level `maven-metadata.xml` that lists available versions.
pub fn parse_metadata(xml: &str) -> miette::Result<MavenMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut meta = MavenMetadata::default();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                text_buf.clear();
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path.join(">");

                match ctx.as_str() {
                    "metadata>groupId" => meta.group_id = Some(text_buf.clone()),
                    "metadata>artifactId" => meta.artifact_id = Some(text_buf.clone()),
                    "metadata>versioning>latest" => meta.latest = Some(text_buf.clone()),
                    "metadata>versioning>release" => meta.release = Some(text_buf.clone()),
                    "metadata>versioning>versions>version" => {
                        meta.versions.push(text_buf.clone());
                    }
                    "metadata>versioning>lastUpdated" => {
                        meta.last_updated = Some(text_buf.clone());
                    }
                    _ => {}
                }

                path.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(KompoError::Generic {
                    message: format!("Failed to parse maven-metadata.xml: {e}"),
                }
                .into());
            }
            _ => {}
        }
    }

    Ok(meta)
}

/// Parse a version-level `maven-metadata.xml` for SNAPSHOT timestamp resolution.
pub fn parse_snapshot_metadata(xml: &str) -> miette::Result<SnapshotMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut meta = SnapshotMetadata::default();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                text_buf.clear();
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path.join(">");

                match ctx.as_str() {
                    "metadata>groupId" => meta.group_id = Some(text_buf.clone()),
                    "metadata>artifactId" => meta.artifact_id = Some(text_buf.clone()),
                    "metadata>version" => meta.version = Some(text_buf.clone()),
                    "metadata>versioning>snapshot>timestamp" => {
                        meta.timestamp = Some(text_buf.clone());
                    }
                    "metadata>versioning>snapshot>buildNumber" => {
                        meta.build_number = text_buf.parse().ok();
                    }
                    "metadata>versioning>lastUpdated" => {
                        meta.last_updated = Some(text_buf.clone());
                    }
                    _ => {}
                }

                path.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(KompoError::Generic {
                    message: format!("Failed to parse snapshot metadata: {e}"),
                }
                .into());
            }
            _ => {}
        }
    }

    Ok(meta)
}
