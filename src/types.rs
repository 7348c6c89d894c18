//! Core type definitions shared across the crate.

use serde::Serialize;
use std::fmt;

/// Identifies a package within one [`Registry`](crate::registry::Registry).
///
/// Ids are plain indices and are only meaningful for the registry that
/// issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub(crate) usize);

/// Identifies a project within one [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId(pub(crate) usize);

/// The kind of build output a project produces.
///
/// A package owns at most one project of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    /// The package's main library.
    Library,
    /// A support library linked only by test executables.
    TestLibrary,
    /// The package's test executable.
    TestExecutable,
}

impl ProjectKind {
    /// Suffix appended to the owning package name to form the project name.
    pub(crate) fn name_suffix(self) -> &'static str {
        match self {
            Self::Library => "",
            Self::TestLibrary => "_testlib",
            Self::TestExecutable => "_test",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library => write!(f, "library"),
            Self::TestLibrary => write!(f, "test library"),
            Self::TestExecutable => write!(f, "test executable"),
        }
    }
}

/// A named unit owning build projects and referencing the packages it
/// depends on.
#[derive(Debug, Clone)]
pub struct Package {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) subpackages: Vec<PackageId>,
    pub(crate) main_lib: Option<ProjectId>,
    pub(crate) test_lib: Option<ProjectId>,
    pub(crate) test_exe: Option<ProjectId>,
}

impl Package {
    /// The package name, unique within one generation run.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root path or namespace, e.g. `github.com/example/ctime`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directly registered sub-packages, in registration order.
    pub fn subpackages(&self) -> &[PackageId] {
        &self.subpackages
    }

    /// The project of the given kind, if one was set up.
    pub fn project(&self, kind: ProjectKind) -> Option<ProjectId> {
        match kind {
            ProjectKind::Library => self.main_lib,
            ProjectKind::TestLibrary => self.test_lib,
            ProjectKind::TestExecutable => self.test_exe,
        }
    }
}

/// One buildable output belonging to exactly one package.
#[derive(Debug, Clone)]
pub struct Project {
    pub(crate) name: String,
    pub(crate) kind: ProjectKind,
    pub(crate) owner: PackageId,
    pub(crate) dependencies: Vec<ProjectId>,
}

impl Project {
    /// The project name, derived from the owning package.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What this project builds.
    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    /// The package this project belongs to.
    pub fn owner(&self) -> PackageId {
        self.owner
    }

    /// Projects this one links against, in declaration order.
    pub fn dependencies(&self) -> &[ProjectId] {
        &self.dependencies
    }
}

/// Serializable snapshot of one composed package, by name only.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDescription {
    pub name: String,
    pub path: String,
    pub subpackages: Vec<String>,
    pub projects: Vec<ProjectDescription>,
}

/// Serializable snapshot of one project and its dependency names.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDescription {
    pub name: String,
    pub kind: ProjectKind,
    pub dependencies: Vec<String>,
}

/// Serializable description of a whole composed graph, root package first.
#[derive(Debug, Clone, Serialize)]
pub struct BuildDescription {
    pub root: String,
    pub packages: Vec<PackageDescription>,
}
