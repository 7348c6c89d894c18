#![allow(dead_code)]

use buildenv::{ComposeError, Composer, Composition, PackageId, ProjectId, ProjectKind, Registry};
use std::cell::Cell;

/// Compose `composer`'s package in a fresh run and return the finished
/// registry with the root package.
pub fn compose(composer: &dyn Composer) -> (Registry, PackageId) {
    let mut composition = Composition::new();
    let root = composition
        .get_package(composer)
        .expect("composition failed");
    (composition.into_registry(), root)
}

/// Names of a project's dependencies, in declaration order.
pub fn dependency_names(registry: &Registry, project: ProjectId) -> Vec<String> {
    registry
        .project(project)
        .dependencies()
        .iter()
        .map(|&dep| registry.project(dep).name().to_string())
        .collect()
}

// Composer fixtures mirroring a small library stack: a time library
// ("ctime") over a core library ("ccore"), tested against a unittest
// framework ("cunittest").

pub struct Unittest;

impl Composer for Unittest {
    fn name(&self) -> &str {
        "cunittest"
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let registry = run.registry_mut();
        let package = registry.create_package("cunittest", "github.com/example/cunittest")?;
        registry.setup_project(package, ProjectKind::Library)?;
        Ok(package)
    }
}

pub struct Core;

impl Composer for Core {
    fn name(&self) -> &str {
        "ccore"
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let registry = run.registry_mut();
        let package = registry.create_package("ccore", "github.com/example/ccore")?;
        registry.setup_project(package, ProjectKind::Library)?;
        Ok(package)
    }
}

pub struct Time;

impl Composer for Time {
    fn name(&self) -> &str {
        "ctime"
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let unittest = run.get_package(&Unittest)?;
        let core = run.get_package(&Core)?;

        let registry = run.registry_mut();
        let package = registry.create_package("ctime", "github.com/example/ctime")?;
        registry.add_subpackage(package, unittest)?;
        registry.add_subpackage(package, core)?;

        let unittest_lib = registry.main_library(unittest)?;
        let core_lib = registry.main_library(core)?;

        let main_lib = registry.setup_project(package, ProjectKind::Library)?;
        registry.add_dependencies(main_lib, &[core_lib])?;

        let test_exe = registry.setup_project(package, ProjectKind::TestExecutable)?;
        registry.add_dependencies(test_exe, &[unittest_lib, core_lib, main_lib])?;

        Ok(package)
    }
}

/// Package carrying all three project kinds, including a test-support
/// library linked by the test executable.
pub struct Utils;

impl Composer for Utils {
    fn name(&self) -> &str {
        "cutils"
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let unittest = run.get_package(&Unittest)?;

        let registry = run.registry_mut();
        let package = registry.create_package("cutils", "github.com/example/cutils")?;
        registry.add_subpackage(package, unittest)?;

        let unittest_lib = registry.main_library(unittest)?;

        let main_lib = registry.setup_project(package, ProjectKind::Library)?;
        let test_lib = registry.setup_project(package, ProjectKind::TestLibrary)?;
        registry.add_dependencies(test_lib, &[main_lib])?;

        let test_exe = registry.setup_project(package, ProjectKind::TestExecutable)?;
        registry.add_dependencies(test_exe, &[unittest_lib, test_lib, main_lib])?;

        Ok(package)
    }
}

/// Leaf package with only a main library, counting how many times its
/// `compose` actually runs.
pub struct Leaf {
    name: &'static str,
    pub composed: Cell<usize>,
}

impl Leaf {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            composed: Cell::new(0),
        }
    }
}

impl Composer for Leaf {
    fn name(&self) -> &str {
        self.name
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        self.composed.set(self.composed.get() + 1);
        let registry = run.registry_mut();
        let package =
            registry.create_package(self.name, format!("github.com/example/{}", self.name))?;
        registry.setup_project(package, ProjectKind::Library)?;
        Ok(package)
    }
}

/// Package whose main library links the main library of every required
/// package.
pub struct Mid<'a> {
    name: &'static str,
    requires: Vec<&'a dyn Composer>,
}

impl<'a> Mid<'a> {
    pub fn new(name: &'static str, requires: Vec<&'a dyn Composer>) -> Self {
        Self { name, requires }
    }
}

impl Composer for Mid<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let mut required = Vec::new();
        for composer in &self.requires {
            required.push(run.get_package(*composer)?);
        }

        let registry = run.registry_mut();
        let package =
            registry.create_package(self.name, format!("github.com/example/{}", self.name))?;
        let mut libs = Vec::new();
        for &dep in &required {
            registry.add_subpackage(package, dep)?;
            libs.push(registry.main_library(dep)?);
        }

        let main_lib = registry.setup_project(package, ProjectKind::Library)?;
        registry.add_dependencies(main_lib, &libs)?;
        Ok(package)
    }
}
