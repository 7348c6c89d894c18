//! The external generator boundary.
//!
//! The core hands a composed package graph to a collaborator through two
//! calls: [`Generator::init`] exactly once before any composition, then
//! [`Generator::generate`] with the finished graph. File emission belongs
//! entirely on the collaborator's side; [`DotGenerator`] and
//! [`JsonGenerator`] are bundled stand-ins that render the graph for
//! inspection instead of emitting native build files.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::composer::{Composer, Composition};
use crate::graph::PackageGraph;
use crate::registry::Registry;
use crate::types::{BuildDescription, PackageId};

/// External collaborator that consumes a composed package graph.
pub trait Generator {
    /// Process-wide setup. Called exactly once, before any composition.
    fn init(&mut self) -> Result<()>;

    /// Consume the composed graph rooted at `root`. The registry is
    /// frozen once it reaches this call.
    fn generate(&mut self, registry: &Registry, root: PackageId) -> Result<()>;
}

/// Compose `composer`'s package and hand the finished graph to
/// `generator`.
///
/// This is the whole control flow of a generation run: init, compose,
/// generate. Any failure aborts the run; there is no partial output.
pub fn run(composer: &dyn Composer, generator: &mut dyn Generator) -> Result<()> {
    generator.init()?;
    let mut composition = Composition::new();
    let root = composition
        .get_package(composer)
        .with_context(|| format!("failed to compose package '{}'", composer.name()))?;
    let registry = composition.into_registry();
    generator.generate(&registry, root)
}

/// Renders the composed graph as a Graphviz DOT file.
pub struct DotGenerator {
    path: PathBuf,
}

impl DotGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Generator for DotGenerator {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn generate(&mut self, registry: &Registry, root: PackageId) -> Result<()> {
        let graph = PackageGraph::build(registry, root)?;
        graph.write_dot_file(&self.path)?;
        info!(path = %self.path.display(), "wrote dependency graph");
        Ok(())
    }
}

/// Writes a JSON description of the composed graph, root package first.
pub struct JsonGenerator {
    path: PathBuf,
}

impl JsonGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Generator for JsonGenerator {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn generate(&mut self, registry: &Registry, root: PackageId) -> Result<()> {
        let graph = PackageGraph::build(registry, root)?;
        let description = BuildDescription {
            root: registry.package(root).name().to_string(),
            packages: graph
                .package_order()
                .into_iter()
                .map(|id| registry.describe(id))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&description)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), "wrote package description");
        Ok(())
    }
}
