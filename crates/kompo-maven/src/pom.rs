//! POM generation for publications.

use std::io;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Writer;

use kompo_core::dependency::DependencyDecl;
use kompo_core::publication::PublicationDescriptor;
use kompo_util::errors::KompoError;

use crate::metadata::{close, emit, open, text_element};

const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const POM_SCHEMA: &str =
    "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";

/// A dependency written into a generated POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: &'static str,
    pub exclusions: Vec<PomExclusion>,
}

/// An exclusion within a dependency declaration. A missing artifact
/// excludes the whole group (`*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: Option<String>,
}

impl PomDependency {
    /// Map a manifest dependency onto its POM entry.
    ///
    /// `version` overrides the declared one; callers pass the local
    /// project's version for substituted coordinates. Configurations that
    /// never reach consumers (`compile-only`, `test-implementation`)
    /// produce `None`.
    pub fn from_decl(decl: &DependencyDecl, version: Option<String>) -> Option<Self> {
        let scope = decl.configuration.pom_scope()?;
        Some(Self {
            group_id: decl.coordinate.group().to_string(),
            artifact_id: decl.coordinate.artifact().to_string(),
            version: version.or_else(|| decl.coordinate.version().map(str::to_string)),
            scope,
            exclusions: decl
                .exclusions
                .iter()
                .map(|e| PomExclusion {
                    group_id: e.group.clone(),
                    artifact_id: e.module.clone(),
                })
                .collect(),
        })
    }
}

/// Render the POM of a publication.
pub fn generate_pom(
    descriptor: &PublicationDescriptor,
    dependencies: &[PomDependency],
) -> miette::Result<String> {
    render_pom(descriptor, dependencies).map_err(|e| {
        KompoError::Publish {
            message: format!("could not write POM: {e}"),
        }
        .into()
    })
}

fn render_pom(
    descriptor: &PublicationDescriptor,
    dependencies: &[PomDependency],
) -> io::Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(
        &mut w,
        Event::Start(BytesStart::new("project").with_attributes([
            ("xmlns", POM_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", POM_SCHEMA),
        ])),
    )?;
    text_element(&mut w, "modelVersion", Some("4.0.0"))?;
    text_element(&mut w, "groupId", Some(&descriptor.group_id))?;
    text_element(&mut w, "artifactId", Some(&descriptor.artifact_id))?;
    text_element(&mut w, "version", Some(&descriptor.version))?;
    if descriptor.packaging != "jar" {
        text_element(&mut w, "packaging", Some(&descriptor.packaging))?;
    }
    text_element(&mut w, "name", Some(&descriptor.artifact_id))?;
    text_element(&mut w, "description", descriptor.description.as_deref())?;

    if !dependencies.is_empty() {
        open(&mut w, "dependencies")?;
        for dep in dependencies {
            open(&mut w, "dependency")?;
            text_element(&mut w, "groupId", Some(&dep.group_id))?;
            text_element(&mut w, "artifactId", Some(&dep.artifact_id))?;
            text_element(&mut w, "version", dep.version.as_deref())?;
            text_element(&mut w, "scope", Some(dep.scope))?;
            if !dep.exclusions.is_empty() {
                open(&mut w, "exclusions")?;
                for ex in &dep.exclusions {
                    open(&mut w, "exclusion")?;
                    text_element(&mut w, "groupId", Some(&ex.group_id))?;
                    let artifact = ex.artifact_id.as_deref().unwrap_or("*");
                    text_element(&mut w, "artifactId", Some(artifact))?;
                    close(&mut w, "exclusion")?;
                }
                close(&mut w, "exclusions")?;
            }
            close(&mut w, "dependency")?;
        }
        close(&mut w, "dependencies")?;
    }

    close(&mut w, "project")?;
    let mut xml = String::from_utf8_lossy(&w.into_inner()).to_string();
    xml.push('\n');
    Ok(xml)
}
