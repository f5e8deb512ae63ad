use kompo_core::coordinate::{Coordinate, ModuleId};
use kompo_core::dependency::{Configuration, Dependency, DetailedDependency, Exclusion};

#[test]
fn coordinate_parse_with_version() {
    let coord = Coordinate::parse("com.pedropathing:ftc:2.0.4").unwrap();
    assert_eq!(coord.group(), "com.pedropathing");
    assert_eq!(coord.artifact(), "ftc");
    assert_eq!(coord.version(), Some("2.0.4"));
}

#[test]
fn coordinate_parse_without_version() {
    let coord = Coordinate::parse("org.solverslib:core").unwrap();
    assert_eq!(coord.module, ModuleId::new("org.solverslib", "core"));
    assert_eq!(coord.version(), None);
}

#[test]
fn coordinate_parse_rejects_bad_shapes() {
    assert!(Coordinate::parse("").is_none());
    assert!(Coordinate::parse("org.solverslib").is_none());
    assert!(Coordinate::parse("org.solverslib::1.0").is_none());
    assert!(Coordinate::parse("g:a:v:extra").is_none());
}

#[test]
fn coordinate_display_roundtrip() {
    for s in ["org.solverslib:core", "org.ejml:ejml-simple:0.39"] {
        assert_eq!(Coordinate::parse(s).unwrap().to_string(), s);
    }
}

#[test]
fn version_is_ignored_by_module_identity() {
    let a = Coordinate::parse("org.solverslib:core:1.0.0").unwrap();
    let b = Coordinate::parse("org.solverslib:core:2.1.1").unwrap();
    assert_eq!(a.module, b.module);
    assert_ne!(a, b);
}

#[test]
fn short_dependency_defaults_to_implementation() {
    let decl = Dependency::Short("com.pedropathing:ftc:2.0.4".into())
        .to_decl("pedro")
        .unwrap();
    assert_eq!(decl.name, "pedro");
    assert_eq!(decl.configuration, Configuration::Implementation);
    assert!(decl.exclusions.is_empty());
}

#[test]
fn detailed_dependency_keeps_exclusions() {
    let dep = Dependency::Detailed(DetailedDependency {
        group: "org.ejml".into(),
        artifact: "ejml-simple".into(),
        version: Some("0.39".into()),
        configuration: Configuration::Api,
        exclude: vec![Exclusion {
            group: "org.ejml".into(),
            module: Some("ejml-all".into()),
        }],
    });
    let decl = dep.to_decl("ejml").unwrap();
    assert_eq!(decl.coordinate.to_string(), "org.ejml:ejml-simple:0.39");
    assert_eq!(decl.exclusions.len(), 1);
    assert_eq!(decl.configuration.pom_scope(), Some("compile"));
}

#[test]
fn pom_scopes_by_configuration() {
    assert_eq!(Configuration::Implementation.pom_scope(), Some("runtime"));
    assert_eq!(Configuration::RuntimeOnly.pom_scope(), Some("runtime"));
    assert_eq!(Configuration::CompileOnly.pom_scope(), None);
    assert_eq!(Configuration::TestImplementation.pom_scope(), None);
}
