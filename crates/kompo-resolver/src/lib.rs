//! Coordinate resolution: substitution rules, first-match repository
//! lookup, version selection and the composite build graph.

pub mod graph;
pub mod resolver;
pub mod version;
