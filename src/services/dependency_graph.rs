//! Generic directed dependency graph.
//!
//! An edge `source -> target` records that `source` depends on `target`.
//! Vertices and edges are kept in insertion order, and every traversal walks
//! them in that order, so cycle reports and tie-breaks are reproducible for a
//! given construction sequence.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown vertex '{vertex}' in edge {depender} -> {dependency}")]
    UnknownVertex {
        vertex: String,
        depender: String,
        dependency: String,
    },
}

#[derive(Debug, Clone)]
struct Vertex {
    id: String,
    description: String,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Vertex, ()>,
    indices: HashMap<String, NodeIndex>,
}

struct DfsFrame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    position: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex. Re-adding a known id keeps the original description
    /// and returns `false`.
    pub fn add_vertex(&mut self, id: &str, description: &str) -> bool {
        if self.indices.contains_key(id) {
            return false;
        }
        let index = self.graph.add_node(Vertex {
            id: id.to_string(),
            description: description.to_string(),
        });
        self.indices.insert(id.to_string(), index);
        true
    }

    /// Records that `source` depends on `target`. Both must already exist.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        let unknown = |vertex: &str| GraphError::UnknownVertex {
            vertex: vertex.to_string(),
            depender: source.to_string(),
            dependency: target.to_string(),
        };
        let source_idx = *self.indices.get(source).ok_or_else(|| unknown(source))?;
        let target_idx = *self.indices.get(target).ok_or_else(|| unknown(target))?;
        self.graph.update_edge(source_idx, target_idx, ());
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.indices.contains_key(id)
    }

    pub fn vertex_ids(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].id.as_str())
            .collect()
    }

    pub fn description(&self, id: &str) -> Option<&str> {
        let idx = self.indices.get(id)?;
        Some(self.graph[*idx].description.as_str())
    }

    /// Vertices `id` depends on.
    pub fn dependencies(&self, id: &str) -> Vec<&str> {
        self.related_ids(id, Direction::Outgoing)
    }

    /// Vertices that list `id` as a dependency.
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.related_ids(id, Direction::Incoming)
    }

    fn related_ids(&self, id: &str, direction: Direction) -> Vec<&str> {
        match self.indices.get(id) {
            Some(idx) => self
                .ordered_neighbors(*idx, direction)
                .into_iter()
                .map(|n| self.graph[n].id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    // petgraph yields adjacent edges newest first; sort by edge index to get
    // insertion order back.
    fn ordered_neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_by_key(|(edge_id, _)| *edge_id);
        edges.into_iter().map(|(_, other)| other).collect()
    }

    /// Returns the first cycle found by a depth-first search started from
    /// each vertex in insertion order. The cycle starts at the vertex that
    /// was revisited and follows dependency edges; its last element depends
    /// on its first.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut on_path: HashSet<NodeIndex> = HashSet::new();
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for root in self.graph.node_indices() {
            if visited.contains(&root) {
                continue;
            }
            visited.insert(root);
            on_path.insert(root);
            let mut stack = vec![self.frame(root)];

            while let Some(frame) = stack.last_mut() {
                let step = if frame.position < frame.neighbors.len() {
                    let next = frame.neighbors[frame.position];
                    frame.position += 1;
                    Some((frame.node, next))
                } else {
                    None
                };

                match step {
                    Some((current, next)) => {
                        if on_path.contains(&next) {
                            return Some(self.reconstruct_cycle(&parent, current, next));
                        }
                        if visited.insert(next) {
                            on_path.insert(next);
                            parent.insert(next, current);
                            stack.push(self.frame(next));
                        }
                    }
                    None => {
                        if let Some(finished) = stack.pop() {
                            on_path.remove(&finished.node);
                        }
                    }
                }
            }
        }

        None
    }

    fn frame(&self, node: NodeIndex) -> DfsFrame {
        DfsFrame {
            node,
            neighbors: self.ordered_neighbors(node, Direction::Outgoing),
            position: 0,
        }
    }

    fn reconstruct_cycle(
        &self,
        parent: &HashMap<NodeIndex, NodeIndex>,
        current: NodeIndex,
        repeated: NodeIndex,
    ) -> Vec<String> {
        let mut chain = vec![current];
        let mut node = current;
        while node != repeated {
            match parent.get(&node) {
                Some(previous) => {
                    node = *previous;
                    chain.push(node);
                }
                None => break,
            }
        }
        chain.reverse();
        chain
            .into_iter()
            .map(|idx| self.graph[idx].id.clone())
            .collect()
    }

    /// Kahn's algorithm over the dependency relation. Returns the order with
    /// dependencies before the vertices that depend on them, or `None` when a
    /// cycle prevents a complete order. Vertices with equal in-degree leave
    /// the queue in insertion order.
    pub fn topological_sort(&self) -> Option<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let incoming = self.graph.edges_directed(idx, Direction::Incoming).count();
                (idx, incoming)
            })
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree.get(idx) == Some(&0))
            .collect();

        let mut order = Vec::with_capacity(self.vertex_count());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for dependency in self.ordered_neighbors(node, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&dependency) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependency);
                    }
                }
            }
        }

        if order.len() < self.vertex_count() {
            debug!(
                sorted = order.len(),
                vertices = self.vertex_count(),
                "topological sort blocked by a cycle"
            );
            return None;
        }

        order.reverse();
        Some(
            order
                .into_iter()
                .map(|idx| self.graph[idx].id.clone())
                .collect(),
        )
    }

    /// Mermaid flowchart with edges pointing from a dependency toward the
    /// vertex that depends on it.
    pub fn to_mermaid(&self) -> String {
        let mut lines = vec!["flowchart TD".to_string()];
        for idx in self.graph.node_indices() {
            let vertex = &self.graph[idx];
            lines.push(format!(
                "    {}[\"{}\"]",
                mermaid_node_id(&vertex.id),
                mermaid_label(&vertex.id, &vertex.description)
            ));
        }
        for idx in self.graph.node_indices() {
            let id = &self.graph[idx].id;
            for dependency in self.ordered_neighbors(idx, Direction::Outgoing) {
                lines.push(format!(
                    "    {} --> {}",
                    mermaid_node_id(&self.graph[dependency].id),
                    mermaid_node_id(id)
                ));
            }
        }
        lines.join("\n")
    }

    pub fn to_markdown_table(&self) -> String {
        let mut lines = vec![
            "| Vertex | Description | Depends on | Enables |".to_string(),
            "|--------|-------------|------------|---------|".to_string(),
        ];
        for id in self.vertex_ids() {
            let description = self.description(id).unwrap_or_default();
            lines.push(format!(
                "| {id} | {description} | {} | {} |",
                list_or_dash(&self.dependencies(id)),
                list_or_dash(&self.dependents(id))
            ));
        }
        lines.join("\n")
    }
}

fn list_or_dash(ids: &[&str]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}

/// Mermaid node ids may only contain word characters. Every other character,
/// `_` included, is written as `_<hex code point>_`, so distinct ids never
/// share a node id.
pub(crate) fn mermaid_node_id(id: &str) -> String {
    let mut node_id = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() {
            node_id.push(c);
        } else {
            node_id.push_str(&format!("_{:x}_", u32::from(c)));
        }
    }
    node_id
}

pub(crate) fn mermaid_label(id: &str, text: &str) -> String {
    let escape = |value: &str| value.replace('"', "#quot;");
    if text.trim().is_empty() {
        escape(id)
    } else {
        format!("{}<br/>{}", escape(id), escape(text))
    }
}
