use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use thiserror::Error;

use crate::registry::Registry;
use crate::types::{PackageId, ProjectId, ProjectKind};

/// Errors reported while building the graph view.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The registered edges contain a cycle.
    #[error("dependency cycle detected involving '{0}'")]
    Cycle(String),
}

/// Node in the composed build graph.
#[derive(Debug, Clone, Copy)]
pub enum Node {
    Package(PackageId),
    Project(ProjectId),
}

/// Edge in the composed build graph.
///
/// `Subpackage` points from parent to child, `Owns` from a package to its
/// project, and `Dependency` from a dependency to its dependent so that a
/// topological sort yields dependencies first.
#[derive(Debug, Clone, Copy)]
pub enum Edge {
    Subpackage,
    Owns,
    Dependency,
}

/// Graph view of one composed package: every package reachable from the
/// root through sub-package edges plus every project those packages own.
pub struct PackageGraph<'a> {
    registry: &'a Registry,
    graph: DiGraph<Node, Edge>,
    order: Vec<NodeIndex>,
}

impl<'a> PackageGraph<'a> {
    /// Build the graph view rooted at `root` and validate it for cycles.
    ///
    /// The registry already rejects cycle-closing registrations, so a
    /// [`GraphError::Cycle`] here means the registry was bypassed.
    pub fn build(registry: &'a Registry, root: PackageId) -> Result<Self, GraphError> {
        let mut graph = DiGraph::<Node, Edge>::new();
        let mut package_nodes = HashMap::<PackageId, NodeIndex>::new();
        let mut project_nodes = HashMap::<ProjectId, NodeIndex>::new();

        // Collect packages reachable from the root, depth-first, keeping
        // a deterministic node order.
        let mut packages = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if package_nodes.contains_key(&id) {
                continue;
            }
            let index = graph.add_node(Node::Package(id));
            package_nodes.insert(id, index);
            packages.push(id);
            for &sub in registry.package(id).subpackages().iter().rev() {
                stack.push(sub);
            }
        }

        let mut projects = Vec::new();
        for &package in &packages {
            let package_index = package_nodes[&package];
            for kind in [
                ProjectKind::Library,
                ProjectKind::TestLibrary,
                ProjectKind::TestExecutable,
            ] {
                if let Some(project) = registry.package(package).project(kind) {
                    let index = graph.add_node(Node::Project(project));
                    project_nodes.insert(project, index);
                    projects.push(project);
                    graph.update_edge(package_index, index, Edge::Owns);
                }
            }
        }

        for &package in &packages {
            for &sub in registry.package(package).subpackages() {
                graph.update_edge(package_nodes[&package], package_nodes[&sub], Edge::Subpackage);
            }
        }

        for &project in &projects {
            for &dep in registry.project(project).dependencies() {
                graph.update_edge(project_nodes[&dep], project_nodes[&project], Edge::Dependency);
            }
        }

        let order = match petgraph::algo::toposort(&graph, None) {
            Ok(order) => order,
            Err(cycle) => {
                let name = match graph[cycle.node_id()] {
                    Node::Package(id) => registry.package(id).name(),
                    Node::Project(id) => registry.project(id).name(),
                };
                return Err(GraphError::Cycle(name.to_string()));
            }
        };

        Ok(Self {
            registry,
            graph,
            order,
        })
    }

    /// Projects in dependency-first order, for emitters that process one
    /// project at a time.
    pub fn build_order(&self) -> Vec<ProjectId> {
        self.order
            .iter()
            .filter_map(|&index| match self.graph[index] {
                Node::Project(id) => Some(id),
                Node::Package(_) => None,
            })
            .collect()
    }

    /// Packages with the root first and sub-packages after their parents.
    pub fn package_order(&self) -> Vec<PackageId> {
        self.order
            .iter()
            .filter_map(|&index| match self.graph[index] {
                Node::Package(id) => Some(id),
                Node::Project(_) => None,
            })
            .collect()
    }

    /// Write the graph to a DOT file.
    pub fn write_dot_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let dot_content = self.dot();
        std::fs::write(path, dot_content)
            .map_err(|e| anyhow::anyhow!("Failed to write DOT file: {e}"))?;
        Ok(())
    }

    /// Render the graph in Graphviz DOT format.
    pub fn dot(&self) -> String {
        let mut output = String::from("digraph PackageGraph {\n");
        output.push_str("  rankdir=BT;\n");
        output.push_str("  node [fontname=\"Arial\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Arial\", fontsize=9];\n");

        for node_index in self.graph.node_indices() {
            let node_attrs = match self.graph[node_index] {
                Node::Package(id) => format!(
                    "[label=\"{}\", shape=doubleoctagon, fillcolor=lightblue, style=\"rounded,filled\"]",
                    self.registry.package(id).name()
                ),
                Node::Project(id) => {
                    let project = self.registry.project(id);
                    let (shape, color) = match project.kind() {
                        ProjectKind::Library => ("box", "lightgreen"),
                        ProjectKind::TestLibrary => ("box", "yellow"),
                        ProjectKind::TestExecutable => ("ellipse", "orange"),
                    };
                    format!(
                        "[label=\"{}\", shape={shape}, fillcolor={color}, style=\"rounded,filled\"]",
                        project.name()
                    )
                }
            };
            output.push_str(&format!("  {} {};\n", node_index.index(), node_attrs));
        }

        for edge_ref in self.graph.edge_references() {
            let edge_attrs = match edge_ref.weight() {
                Edge::Dependency => "[color=blue, style=solid]",
                Edge::Subpackage => "[color=gray, style=dashed]",
                Edge::Owns => "[color=black, style=solid]",
            };
            output.push_str(&format!(
                "  {} -> {} {};\n",
                edge_ref.source().index(),
                edge_ref.target().index(),
                edge_attrs
            ));
        }

        output.push_str("}\n");
        output
    }

    fn node_name(&self, index: NodeIndex) -> &str {
        match self.graph[index] {
            Node::Package(id) => self.registry.package(id).name(),
            Node::Project(id) => self.registry.project(id).name(),
        }
    }
}

impl std::fmt::Debug for PackageGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("PackageGraph");

        let nodes: Vec<_> = self
            .graph
            .node_indices()
            .map(|index| self.node_name(index))
            .collect();
        debug_struct.field("nodes", &nodes);

        let edges: Vec<String> = self
            .graph
            .edge_references()
            .map(|edge| {
                format!(
                    "{} -> {} ({:?})",
                    self.node_name(edge.source()),
                    self.node_name(edge.target()),
                    edge.weight()
                )
            })
            .collect();
        debug_struct.field("edges", &edges);
        debug_struct.finish()
    }
}
