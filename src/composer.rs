//! Package composition.
//!
//! A [`Composer`] assembles one package's full graph from static
//! declarations: it obtains its dependency packages (themselves composed
//! by their own composers), creates the local package, registers
//! sub-packages, sets up projects, and wires dependency edges. The
//! [`Composition`] session memoizes by package name so that diamond-shaped
//! dependency graphs compose each shared package exactly once.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::registry::{Registry, RegistryError};
use crate::types::PackageId;

/// Errors that abort a composition run.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A registry call failed; the composition cannot continue.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Composers required each other, directly or transitively.
    #[error("circular composition detected: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// A composer returned a package whose name differs from its own.
    #[error("composer '{expected}' composed a package named '{actual}'")]
    NameMismatch { expected: String, actual: String },
}

/// A package unit that knows how to assemble its own dependency graph.
///
/// Implementations perform a fixed sequence with no runtime input: obtain
/// each directly-required package via [`Composition::get_package`], create
/// the local package, register the obtained packages as sub-packages, set
/// up the local projects, and wire their dependencies.
pub trait Composer {
    /// The name of the package this composer produces.
    fn name(&self) -> &str;

    /// Build the package and everything it requires into the run's
    /// registry, returning the finished package.
    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError>;
}

/// One generation run.
///
/// Owns the run-scoped [`Registry`] together with the memo table that
/// makes [`Composition::get_package`] idempotent within the run.
#[derive(Debug, Default)]
pub struct Composition {
    registry: Registry,
    composed: HashMap<String, PackageId>,
    in_progress: Vec<String>,
}

impl Composition {
    /// Start a fresh run with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The run's registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access for composers wiring their packages.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Consume the run, keeping the composed registry.
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Compose `composer`'s package, or return it if it was already
    /// composed during this run.
    ///
    /// Re-entrant composition of a package that is still being composed
    /// fails with [`ComposeError::Cycle`] carrying the composer chain.
    pub fn get_package(&mut self, composer: &dyn Composer) -> Result<PackageId, ComposeError> {
        let name = composer.name();
        if let Some(&id) = self.composed.get(name) {
            debug!(package = name, "reusing composed package");
            return Ok(id);
        }
        if self.in_progress.iter().any(|n| n == name) {
            let mut chain = self.in_progress.clone();
            chain.push(name.to_string());
            return Err(ComposeError::Cycle { chain });
        }

        self.in_progress.push(name.to_string());
        let result = composer.compose(self);
        self.in_progress.pop();

        let id = result?;
        let actual = self.registry.package(id).name();
        if actual != name {
            return Err(ComposeError::NameMismatch {
                expected: name.to_string(),
                actual: actual.to_string(),
            });
        }
        info!(package = name, "composed package");
        self.composed.insert(name.to_string(), id);
        Ok(id)
    }
}
