use anyhow::Result;
use buildenv::graph::PackageGraph;
use buildenv::{
    ComposeError, Composer, Composition, DotGenerator, JsonGenerator, PackageId, ProjectKind, run,
};
use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildenv")]
#[command(about = "Compose the bundled sample package graph and inspect it")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ModeArgs {
    /// Perform a dry run, printing the dependency graph without invoking a generator
    #[arg(long, short)]
    dry_run: bool,

    /// Export the package graph to a DOT file (graph.dot)
    #[arg(long, short)]
    export: bool,

    /// Write a JSON description of the composed packages (packages.json)
    #[arg(long, short = 'D')]
    describe: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let cli = Cli::parse();
    let composer = TimeComposer;

    if cli.mode.dry_run {
        let mut composition = Composition::new();
        let root = composition.get_package(&composer)?;
        let graph = PackageGraph::build(composition.registry(), root)?;
        println!("--- Package Dependency Graph (Dry Run) ---");
        println!("{graph:#?}");
        println!("------------------------------------------");
    } else if cli.mode.export {
        let filename = "graph.dot";
        run(&composer, &mut DotGenerator::new(filename))?;
        println!("Graph exported to {filename}");
    } else if cli.mode.describe {
        let filename = "packages.json";
        run(&composer, &mut JsonGenerator::new(filename))?;
        println!("Description written to {filename}");
    }

    Ok(())
}

// Sample package family: a time library over a base library, with a test
// executable linking the unittest framework, the base library, and the
// local library.

struct UnittestComposer;

impl Composer for UnittestComposer {
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

struct BaseComposer;

impl Composer for BaseComposer {
    fn name(&self) -> &str {
        "cbase"
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let unittest = run.get_package(&UnittestComposer)?;

        let registry = run.registry_mut();
        let package = registry.create_package("cbase", "github.com/example/cbase")?;
        registry.add_subpackage(package, unittest)?;

        let unittest_lib = registry.main_library(unittest)?;
        let main_lib = registry.setup_project(package, ProjectKind::Library)?;
        let test_exe = registry.setup_project(package, ProjectKind::TestExecutable)?;
        registry.add_dependencies(test_exe, &[unittest_lib, main_lib])?;

        Ok(package)
    }
}

struct TimeComposer;

impl Composer for TimeComposer {
    fn name(&self) -> &str {
        "ctime"
    }

    fn compose(&self, run: &mut Composition) -> Result<PackageId, ComposeError> {
        let unittest = run.get_package(&UnittestComposer)?;
        let base = run.get_package(&BaseComposer)?;

        let registry = run.registry_mut();
        let package = registry.create_package("ctime", "github.com/example/ctime")?;
        registry.add_subpackage(package, unittest)?;
        registry.add_subpackage(package, base)?;

        let unittest_lib = registry.main_library(unittest)?;
        let base_lib = registry.main_library(base)?;

        let main_lib = registry.setup_project(package, ProjectKind::Library)?;
        registry.add_dependencies(main_lib, &[base_lib])?;

        let test_exe = registry.setup_project(package, ProjectKind::TestExecutable)?;
        registry.add_dependencies(test_exe, &[unittest_lib, base_lib, main_lib])?;

        Ok(package)
    }
}
