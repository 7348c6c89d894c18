mod common;

use buildenv::graph::PackageGraph;
use buildenv::{DotGenerator, JsonGenerator, run};

#[test]
fn dot_generator_writes_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.dot");

    run(&common::Time, &mut DotGenerator::new(&path)).unwrap();

    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.starts_with("digraph PackageGraph {"));
    for label in ["ctime", "ctime_test", "ccore", "cunittest"] {
        assert!(
            dot.contains(&format!("label=\"{label}\"")),
            "missing node '{label}' in:\n{dot}"
        );
    }
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn json_generator_describes_the_composition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("package.json");

    run(&common::Time, &mut JsonGenerator::new(&path)).unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    let description: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(description["root"], "ctime");
    let packages = description["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 3);

    // The root package leads the description.
    let root = &packages[0];
    assert_eq!(root["name"], "ctime");
    assert_eq!(root["path"], "github.com/example/ctime");
    assert_eq!(
        root["subpackages"],
        serde_json::json!(["cunittest", "ccore"])
    );

    let projects = root["projects"].as_array().unwrap();
    let main_lib = projects.iter().find(|p| p["name"] == "ctime").unwrap();
    assert_eq!(main_lib["kind"], "library");
    assert_eq!(main_lib["dependencies"], serde_json::json!(["ccore"]));

    let test_exe = projects.iter().find(|p| p["name"] == "ctime_test").unwrap();
    assert_eq!(test_exe["kind"], "test-executable");
    assert_eq!(
        test_exe["dependencies"],
        serde_json::json!(["cunittest", "ccore", "ctime"])
    );
}

#[test]
fn json_description_includes_test_support_libraries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("package.json");

    run(&common::Utils, &mut JsonGenerator::new(&path)).unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    let description: serde_json::Value = serde_json::from_str(&json).unwrap();

    let packages = description["packages"].as_array().unwrap();
    let projects = packages[0]["projects"].as_array().unwrap();
    let test_lib = projects
        .iter()
        .find(|p| p["name"] == "cutils_testlib")
        .unwrap();
    assert_eq!(test_lib["kind"], "test-library");
    assert_eq!(test_lib["dependencies"], serde_json::json!(["cutils"]));
}

#[test]
fn build_order_places_dependencies_first() {
    let (registry, root) = common::compose(&common::Time);
    let graph = PackageGraph::build(&registry, root).unwrap();

    let order = graph.build_order();
    assert_eq!(order.len(), 4);

    let position = |name: &str| {
        order
            .iter()
            .position(|&id| registry.project(id).name() == name)
            .unwrap_or_else(|| panic!("project '{name}' missing from build order"))
    };
    assert!(position("ccore") < position("ctime"));
    assert!(position("ctime") < position("ctime_test"));
    assert!(position("cunittest") < position("ctime_test"));
}

#[test]
fn package_order_starts_at_the_root() {
    let (registry, root) = common::compose(&common::Time);
    let graph = PackageGraph::build(&registry, root).unwrap();

    let order = graph.package_order();
    assert_eq!(order.len(), 3);
    assert_eq!(registry.package(order[0]).name(), "ctime");
}

#[test]
fn debug_rendering_names_nodes_and_edges() {
    let (registry, root) = common::compose(&common::Time);
    let graph = PackageGraph::build(&registry, root).unwrap();

    let rendered = format!("{graph:?}");
    assert!(rendered.contains("\"ctime\""));
    assert!(rendered.contains("ctime -> ctime_test (Owns)"));
    assert!(rendered.contains("ccore -> ctime (Dependency)"));
    assert!(rendered.contains("ctime -> ccore (Subpackage)"));
}
