use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::services::dependency_graph::{DependencyGraph, GraphError};

#[derive(Error, Debug)]
pub enum GraphYamlError {
    #[error("failed to read graph yaml {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse graph yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphFileRecord {
    #[serde(default)]
    vertices: Vec<VertexRecord>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VertexRecord {
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    dependencies: Vec<String>,
}

pub fn load_graph_from_yaml_file<P: AsRef<Path>>(path: P) -> Result<DependencyGraph, GraphYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| GraphYamlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_graph_from_yaml_str(&contents)
}

/// Every vertex is registered before any edge, so dependencies may refer to
/// vertices listed further down the file.
pub fn deserialize_graph_from_yaml_str(input: &str) -> Result<DependencyGraph, GraphYamlError> {
    let record: GraphFileRecord = serde_yaml::from_str(input)?;
    let mut graph = DependencyGraph::new();
    for vertex in &record.vertices {
        graph.add_vertex(&vertex.id, &vertex.description);
    }
    for vertex in &record.vertices {
        for dependency in &vertex.dependencies {
            graph.add_edge(&vertex.id, dependency)?;
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_references_are_resolved() {
        let yaml = r#"
vertices:
  - id: deploy
    description: Ship it
    dependencies: [build, test]
  - id: build
  - id: test
    dependencies: [build]
"#;
        let graph = deserialize_graph_from_yaml_str(yaml).unwrap();
        assert_eq!(graph.vertex_ids(), vec!["deploy", "build", "test"]);
        assert_eq!(graph.dependencies("deploy"), vec!["build", "test"]);
        assert_eq!(graph.description("deploy"), Some("Ship it"));
        assert_eq!(
            graph.topological_sort(),
            Some(vec!["build".to_string(), "test".to_string(), "deploy".to_string()])
        );
    }

    #[test]
    fn unknown_dependency_is_a_graph_error() {
        let yaml = "vertices:\n  - id: a\n    dependencies: [ghost]\n";
        let error = deserialize_graph_from_yaml_str(yaml).unwrap_err();
        assert!(matches!(
            error,
            GraphYamlError::Graph(GraphError::UnknownVertex { ref vertex, .. }) if vertex == "ghost"
        ));
    }
}
