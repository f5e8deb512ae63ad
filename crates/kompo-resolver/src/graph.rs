//! The composite build graph: which local builds must run before a
//! requester, and which published artifacts it fetches.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use kompo_core::coordinate::Coordinate;
use kompo_core::substitution::LocalProject;
use kompo_util::errors::KompoError;

use crate::resolver::{Resolution, Resolvable};

/// A node in the build graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildNode {
    /// The project whose manifest started resolution.
    Requester { name: String },
    /// A project of an included build.
    Local { project: LocalProject },
    /// A published artifact at its selected version.
    Published { coordinate: Coordinate },
}

impl BuildNode {
    fn key(&self) -> String {
        match self {
            Self::Requester { name } => format!("requester {name}"),
            Self::Local { project } => format!("project {}", project.build_path()),
            Self::Published { coordinate } => coordinate.to_string(),
        }
    }
}

impl fmt::Display for BuildNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requester { name } => f.write_str(name),
            Self::Local { project } => write!(f, "project {project}"),
            Self::Published { coordinate } => write!(f, "{coordinate}"),
        }
    }
}

/// Edges point from a prerequisite to the node that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEdge {
    /// The local project is built before its dependent.
    BuildsBefore { requested: Coordinate },
    /// The artifact is downloaded from `repository`.
    Fetches { repository: String },
}

pub struct BuildGraph {
    graph: DiGraph<BuildNode, BuildEdge>,
    index: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl BuildGraph {
    /// A graph holding only the requesting project.
    pub fn new(requester: &str) -> Self {
        let mut graph = DiGraph::new();
        let node = BuildNode::Requester {
            name: requester.to_string(),
        };
        let mut index = HashMap::new();
        let root = graph.add_node(node.clone());
        index.insert(node.key(), root);
        Self { graph, index, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Add or retrieve a node.
    fn add_node(&mut self, node: BuildNode) -> NodeIndex {
        let key = node.key();
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(key, idx);
        idx
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: BuildEdge) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, edge);
        }
    }

    /// Node of a local project, added if missing.
    pub fn local_node(&mut self, project: &LocalProject) -> NodeIndex {
        self.add_node(BuildNode::Local {
            project: project.clone(),
        })
    }

    /// Record a resolution made on behalf of `requester`: a substitution
    /// schedules the local project before the requester, a repository hit
    /// adds a fetch.
    pub fn record(&mut self, requester: NodeIndex, resolution: &Resolution) -> NodeIndex {
        match &resolution.target {
            Resolvable::LocalBuildOutput { project } => {
                let idx = self.local_node(project);
                self.add_edge(
                    idx,
                    requester,
                    BuildEdge::BuildsBefore {
                        requested: resolution.requested.clone(),
                    },
                );
                idx
            }
            Resolvable::PublishedArtifact {
                coordinate,
                repository,
            } => {
                let idx = self.add_node(BuildNode::Published {
                    coordinate: coordinate.clone(),
                });
                self.add_edge(
                    idx,
                    requester,
                    BuildEdge::Fetches {
                        repository: repository.clone(),
                    },
                );
                idx
            }
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &BuildNode {
        &self.graph[idx]
    }

    /// Prerequisites of a node, in insertion order.
    pub fn prerequisites_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &BuildEdge)> {
        let mut deps: Vec<(NodeIndex, &BuildEdge)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect();
        deps.sort_by_key(|(n, _)| n.index());
        deps
    }

    /// Local projects in the order they must be built: every project comes
    /// after the projects it depends on.
    pub fn build_order(&self) -> miette::Result<Vec<&LocalProject>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| KompoError::BuildCycle {
            project: self.graph[cycle.node_id()].to_string(),
        })?;
        Ok(sorted
            .into_iter()
            .filter_map(|idx| match &self.graph[idx] {
                BuildNode::Local { project } => Some(project),
                _ => None,
            })
            .collect())
    }

    /// Every local project in the graph.
    pub fn local_projects(&self) -> Vec<&LocalProject> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                BuildNode::Local { project } => Some(project),
                _ => None,
            })
            .collect()
    }

    /// Print the requester and its prerequisites as a tree.
    pub fn print_tree(&self) -> String {
        let mut output = format!("{}\n", self.graph[self.root]);
        let mut visited = HashSet::new();
        visited.insert(self.root);

        let deps = self.prerequisites_of(self.root);
        let count = deps.len();
        for (i, (idx, edge)) in deps.iter().enumerate() {
            self.print_subtree(&mut output, *idx, edge, "", i == count - 1, &mut visited);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: &BuildEdge,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        let line = match edge {
            BuildEdge::BuildsBefore { requested } => format!("{requested} => {node}"),
            BuildEdge::Fetches { repository } => format!("{node} ({repository})"),
        };
        output.push_str(&format!("{prefix}{connector}{line}\n"));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.prerequisites_of(idx);
        let count = deps.len();
        for (i, (child, child_edge)) in deps.iter().enumerate() {
            self.print_subtree(
                output,
                *child,
                child_edge,
                &child_prefix,
                i == count - 1,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Number of nodes besides the requester.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
