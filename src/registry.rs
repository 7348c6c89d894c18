//! The run-scoped dependency registry.
//!
//! A [`Registry`] holds every package and project declared during one
//! generation run. Package names form a uniqueness domain scoped to the
//! registry, sub-package registration keeps the package graph acyclic, and
//! dependency wiring only accepts projects whose owning package was
//! declared first. All operations mutate in-memory state; no I/O happens
//! here.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::types::{
    Package, PackageDescription, PackageId, Project, ProjectDescription, ProjectId, ProjectKind,
};

/// Errors reported by registry operations.
///
/// Every kind is detected synchronously at the offending call.
/// [`RegistryError::NotConfigured`] is the only recoverable kind: callers
/// querying an absent project must treat it as "this package exposes no
/// such artifact".
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A package with this name already exists in the current run.
    #[error("a package named '{0}' is already registered")]
    DuplicateName(String),

    /// The edge would make a package or project reachable from itself.
    #[error("'{from}' -> '{to}' would create a dependency cycle")]
    Cycle { from: String, to: String },

    /// The package already owns a project of this kind.
    #[error("package '{package}' already has a {kind}")]
    DuplicateProject {
        package: String,
        kind: ProjectKind,
    },

    /// The dependency's owning package was never registered as a
    /// sub-package of the dependent's owner.
    #[error(
        "'{project}' cannot depend on '{dependency}': package '{dependency_owner}' is not a sub-package of '{owner}'"
    )]
    UnknownDependency {
        project: String,
        dependency: String,
        dependency_owner: String,
        owner: String,
    },

    /// The package owns no project of this kind.
    #[error("package '{package}' has no {kind}")]
    NotConfigured {
        package: String,
        kind: ProjectKind,
    },
}

/// In-memory package and project store for one generation run.
///
/// Ids handed out by a registry index into that registry only; accessor
/// methods panic when given an id from a different registry.
#[derive(Debug, Default)]
pub struct Registry {
    packages: Vec<Package>,
    projects: Vec<Project>,
    names: HashMap<String, PackageId>,
}

impl Registry {
    /// Create an empty registry scoped to one generation run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new package with no sub-packages and no projects.
    pub fn create_package(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<PackageId, RegistryError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        let id = PackageId(self.packages.len());
        debug!(package = %name, "created package");
        self.names.insert(name.clone(), id);
        self.packages.push(Package {
            name,
            path: path.into(),
            subpackages: Vec::new(),
            main_lib: None,
            test_lib: None,
            test_exe: None,
        });
        Ok(id)
    }

    /// Append `child` to `parent`'s sub-package set.
    ///
    /// Registering a child that is already present is a no-op. The call
    /// fails with [`RegistryError::Cycle`] if `child` transitively
    /// contains `parent`.
    pub fn add_subpackage(
        &mut self,
        parent: PackageId,
        child: PackageId,
    ) -> Result<(), RegistryError> {
        if self.packages[parent.0].subpackages.contains(&child) {
            debug!(
                parent = %self.packages[parent.0].name,
                child = %self.packages[child.0].name,
                "sub-package already registered"
            );
            return Ok(());
        }
        if parent == child || self.package_reaches(child, parent) {
            return Err(RegistryError::Cycle {
                from: self.packages[parent.0].name.clone(),
                to: self.packages[child.0].name.clone(),
            });
        }
        self.packages[parent.0].subpackages.push(child);
        Ok(())
    }

    /// Create and attach a project of the given kind to `package`.
    ///
    /// The project name is derived from the package name. A package owns
    /// at most one project of each kind.
    pub fn setup_project(
        &mut self,
        package: PackageId,
        kind: ProjectKind,
    ) -> Result<ProjectId, RegistryError> {
        let pkg = &self.packages[package.0];
        if pkg.project(kind).is_some() {
            return Err(RegistryError::DuplicateProject {
                package: pkg.name.clone(),
                kind,
            });
        }
        let name = format!("{}{}", pkg.name, kind.name_suffix());
        let id = ProjectId(self.projects.len());
        debug!(project = %name, %kind, "set up project");
        self.projects.push(Project {
            name,
            kind,
            owner: package,
            dependencies: Vec::new(),
        });
        let pkg = &mut self.packages[package.0];
        match kind {
            ProjectKind::Library => pkg.main_lib = Some(id),
            ProjectKind::TestLibrary => pkg.test_lib = Some(id),
            ProjectKind::TestExecutable => pkg.test_exe = Some(id),
        }
        Ok(id)
    }

    /// Append dependency references to `project`, in order, skipping ones
    /// already present.
    ///
    /// Every dependency must be owned by the dependent's own package or by
    /// one of its registered sub-packages. On failure the dependency
    /// sequence is left exactly as it was before the call.
    pub fn add_dependencies(
        &mut self,
        project: ProjectId,
        dependencies: &[ProjectId],
    ) -> Result<(), RegistryError> {
        let owner = self.projects[project.0].owner;
        for &dep in dependencies {
            let dep_owner = self.projects[dep.0].owner;
            if dep_owner != owner && !self.packages[owner.0].subpackages.contains(&dep_owner) {
                return Err(RegistryError::UnknownDependency {
                    project: self.projects[project.0].name.clone(),
                    dependency: self.projects[dep.0].name.clone(),
                    dependency_owner: self.packages[dep_owner.0].name.clone(),
                    owner: self.packages[owner.0].name.clone(),
                });
            }
            if dep == project || self.project_reaches(dep, project) {
                return Err(RegistryError::Cycle {
                    from: self.projects[project.0].name.clone(),
                    to: self.projects[dep.0].name.clone(),
                });
            }
        }
        for &dep in dependencies {
            if self.projects[project.0].dependencies.contains(&dep) {
                debug!(
                    project = %self.projects[project.0].name,
                    dependency = %self.projects[dep.0].name,
                    "skipping duplicate dependency"
                );
                continue;
            }
            self.projects[project.0].dependencies.push(dep);
        }
        Ok(())
    }

    /// The package's main library.
    pub fn main_library(&self, package: PackageId) -> Result<ProjectId, RegistryError> {
        self.find_project(package, ProjectKind::Library)
    }

    /// The package's test-support library.
    pub fn test_library(&self, package: PackageId) -> Result<ProjectId, RegistryError> {
        self.find_project(package, ProjectKind::TestLibrary)
    }

    /// The package's test executable.
    pub fn test_executable(&self, package: PackageId) -> Result<ProjectId, RegistryError> {
        self.find_project(package, ProjectKind::TestExecutable)
    }

    fn find_project(
        &self,
        package: PackageId,
        kind: ProjectKind,
    ) -> Result<ProjectId, RegistryError> {
        let pkg = &self.packages[package.0];
        pkg.project(kind).ok_or_else(|| RegistryError::NotConfigured {
            package: pkg.name.clone(),
            kind,
        })
    }

    /// Look up a package id by name.
    pub fn lookup(&self, name: &str) -> Option<PackageId> {
        self.names.get(name).copied()
    }

    /// The package behind `id`.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    /// The project behind `id`.
    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    /// All packages in creation order.
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId(i), p))
    }

    /// All projects in creation order.
    pub fn projects(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .map(|(i, p)| (ProjectId(i), p))
    }

    /// Snapshot one package and its projects by name.
    pub fn describe(&self, package: PackageId) -> PackageDescription {
        let pkg = &self.packages[package.0];
        let projects = [pkg.main_lib, pkg.test_lib, pkg.test_exe]
            .into_iter()
            .flatten()
            .map(|id| {
                let project = &self.projects[id.0];
                ProjectDescription {
                    name: project.name.clone(),
                    kind: project.kind,
                    dependencies: project
                        .dependencies
                        .iter()
                        .map(|&dep| self.projects[dep.0].name.clone())
                        .collect(),
                }
            })
            .collect();
        PackageDescription {
            name: pkg.name.clone(),
            path: pkg.path.clone(),
            subpackages: pkg
                .subpackages
                .iter()
                .map(|&sub| self.packages[sub.0].name.clone())
                .collect(),
            projects,
        }
    }

    /// True if `from` can reach `to` through sub-package edges.
    fn package_reaches(&self, from: PackageId, to: PackageId) -> bool {
        let mut seen = vec![false; self.packages.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            for &sub in &self.packages[id.0].subpackages {
                if !seen[sub.0] {
                    seen[sub.0] = true;
                    stack.push(sub);
                }
            }
        }
        false
    }

    /// True if `from` can reach `to` through dependency edges.
    fn project_reaches(&self, from: ProjectId, to: ProjectId) -> bool {
        let mut seen = vec![false; self.projects.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            for &dep in &self.projects[id.0].dependencies {
                if !seen[dep.0] {
                    seen[dep.0] = true;
                    stack.push(dep);
                }
            }
        }
        false
    }
}
