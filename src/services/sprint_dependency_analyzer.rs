//! Dependency analysis for the assignments of one sprint.
//!
//! Dependencies pointing outside the sprint become external nodes. The
//! analysis reports every cycle reachable by depth-first search and suggests
//! an execution order that puts work which can start right away first.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::assignment::Assignment;
use crate::domain::timebox::TimeBox;
use crate::domain::work_item::{DependencyRef, ItemStatus};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("assignment #{position} has no issue id")]
    MissingIssueId { position: usize },
    #[error("issue {issue} has no assignee name")]
    MissingAssignee { issue: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub title: Option<String>,
    pub in_sprint: bool,
    pub status: ItemStatus,
    pub assignee: Option<String>,
    pub implemented: bool,
}

/// Internal edges point at an item of the sprint, external ones outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    Internal,
    External,
}

/// Graph of one sprint. Edges run from an item to each of its dependencies;
/// the reverse direction answers "what does finishing this unblock".
#[derive(Debug, Clone, Default)]
pub struct SprintGraph {
    graph: DiGraph<GraphNode, EdgeKind>,
    indices: HashMap<String, NodeIndex>,
}

impl SprintGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.indices.get(id).map(|idx| &self.graph[*idx])
    }

    /// Nodes in the order they were added: sprint items first, then external
    /// dependencies in order of first reference.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn external_nodes(&self) -> Vec<&GraphNode> {
        self.nodes().filter(|node| !node.in_sprint).collect()
    }

    pub fn dependencies(&self, id: &str) -> Vec<(&GraphNode, EdgeKind)> {
        match self.indices.get(id) {
            Some(idx) => self
                .ordered_edges(*idx, Direction::Outgoing)
                .into_iter()
                .map(|(other, kind)| (&self.graph[other], kind))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn dependents(&self, id: &str) -> Vec<&GraphNode> {
        match self.indices.get(id) {
            Some(idx) => self
                .ordered_edges(*idx, Direction::Incoming)
                .into_iter()
                .map(|(other, _)| &self.graph[other])
                .collect(),
            None => Vec::new(),
        }
    }

    fn ordered_edges(&self, node: NodeIndex, direction: Direction) -> Vec<(NodeIndex, EdgeKind)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), other, *edge.weight())
            })
            .collect();
        edges.sort_by_key(|(edge_id, _, _)| *edge_id);
        edges
            .into_iter()
            .map(|(_, other, kind)| (other, kind))
            .collect()
    }

    fn add_sprint_item(&mut self, assignment: &Assignment) -> bool {
        if self.indices.contains_key(assignment.id()) {
            return false;
        }
        let node = GraphNode {
            id: assignment.id().to_string(),
            title: Some(assignment.item.title.clone()),
            in_sprint: true,
            status: assignment.status.clone(),
            assignee: Some(assignment.assignee.name.clone()),
            implemented: assignment.is_done(),
        };
        let idx = self.graph.add_node(node);
        self.indices.insert(assignment.id().to_string(), idx);
        true
    }

    fn add_external_if_unknown(&mut self, dependency: &DependencyRef) -> NodeIndex {
        if let Some(idx) = self.indices.get(&dependency.id) {
            return *idx;
        }
        let status = dependency
            .status
            .clone()
            .unwrap_or_else(ItemStatus::external);
        let node = GraphNode {
            id: dependency.id.clone(),
            title: dependency.title.clone(),
            in_sprint: false,
            implemented: status.is_done(),
            status,
            assignee: None,
        };
        let idx = self.graph.add_node(node);
        self.indices.insert(dependency.id.clone(), idx);
        idx
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExecutionOrder {
    Ordered(Vec<String>),
    /// Items caught in or behind a cycle never become ready; `resolved`
    /// holds the items that could still be ordered.
    CycleDetected { resolved: Vec<String> },
}

impl ExecutionOrder {
    pub fn ids(&self) -> &[String] {
        match self {
            ExecutionOrder::Ordered(ids) => ids,
            ExecutionOrder::CycleDetected { resolved } => resolved,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ExecutionOrder::Ordered(_))
    }
}

#[derive(Debug, Clone)]
pub struct SprintDependencyReport {
    pub graph: SprintGraph,
    pub cycles: Vec<Vec<String>>,
    /// Items without dependencies inside the sprint, in discovery order.
    pub independent: Vec<String>,
    pub dependent: Vec<String>,
    pub execution_order: ExecutionOrder,
}

impl SprintDependencyReport {
    fn empty() -> Self {
        Self {
            graph: SprintGraph::default(),
            cycles: Vec::new(),
            independent: Vec::new(),
            dependent: Vec::new(),
            execution_order: ExecutionOrder::Ordered(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

pub fn analyze_timebox(timebox: &TimeBox) -> Result<SprintDependencyReport, AnalyzerError> {
    analyze_sprint_dependencies(&timebox.assignments)
}

pub fn analyze_sprint_dependencies(
    assignments: &[Assignment],
) -> Result<SprintDependencyReport, AnalyzerError> {
    validate_assignments(assignments)?;
    if assignments.is_empty() {
        debug!("no assignments to analyze");
        return Ok(SprintDependencyReport::empty());
    }

    let graph = build_sprint_graph(assignments);
    let cycles = find_cycles(&graph);
    if !cycles.is_empty() {
        warn!(cycles = cycles.len(), "circular dependencies in sprint");
    }
    let (independent, dependent) = split_by_readiness(&graph);
    let execution_order = suggest_execution_order(&graph, &independent, &dependent);
    debug!(
        nodes = graph.node_count(),
        external = graph.external_nodes().len(),
        independent = independent.len(),
        dependent = dependent.len(),
        "sprint dependency graph analyzed"
    );

    Ok(SprintDependencyReport {
        graph,
        cycles,
        independent,
        dependent,
        execution_order,
    })
}

fn validate_assignments(assignments: &[Assignment]) -> Result<(), AnalyzerError> {
    for (position, assignment) in assignments.iter().enumerate() {
        if assignment.id().trim().is_empty() {
            return Err(AnalyzerError::MissingIssueId { position });
        }
        if assignment.assignee.name.trim().is_empty() {
            return Err(AnalyzerError::MissingAssignee {
                issue: assignment.id().to_string(),
            });
        }
    }
    Ok(())
}

/// Builds the graph in two passes so that a dependency on an item listed
/// later in the sprint still resolves as internal.
pub fn build_sprint_graph(assignments: &[Assignment]) -> SprintGraph {
    let mut graph = SprintGraph::default();
    for assignment in assignments {
        if !graph.add_sprint_item(assignment) {
            warn!(issue = assignment.id(), "duplicate assignment ignored");
        }
    }

    let mut linked: HashSet<&str> = HashSet::new();
    for assignment in assignments {
        // Only the first occurrence of a duplicated id contributes edges.
        if !linked.insert(assignment.id()) {
            continue;
        }
        let Some(&item_idx) = graph.indices.get(assignment.id()) else {
            continue;
        };
        for dependency in &assignment.item.dependencies {
            let dep_idx = graph.add_external_if_unknown(dependency);
            let kind = if graph.graph[dep_idx].in_sprint {
                EdgeKind::Internal
            } else {
                EdgeKind::External
            };
            graph.graph.update_edge(item_idx, dep_idx, kind);
        }
    }
    graph
}

struct DfsFrame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    position: usize,
}

/// Enumerates cycles with a depth-first search from every unvisited node.
/// Reconverging paths may report overlapping cycles more than once.
pub fn find_cycles(graph: &SprintGraph) -> Vec<Vec<String>> {
    let frame = |node: NodeIndex| DfsFrame {
        node,
        neighbors: graph
            .ordered_edges(node, Direction::Outgoing)
            .into_iter()
            .map(|(other, _)| other)
            .collect(),
        position: 0,
    };

    let mut cycles = Vec::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut on_stack: HashSet<NodeIndex> = HashSet::new();
    let mut path: Vec<NodeIndex> = Vec::new();

    for root in graph.graph.node_indices() {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        path.push(root);
        let mut stack = vec![frame(root)];

        while let Some(top) = stack.last_mut() {
            if top.position < top.neighbors.len() {
                let next = top.neighbors[top.position];
                top.position += 1;
                if on_stack.contains(&next) {
                    if let Some(start) = path.iter().position(|idx| *idx == next) {
                        cycles.push(
                            path[start..]
                                .iter()
                                .map(|idx| graph.graph[*idx].id.clone())
                                .collect(),
                        );
                    }
                } else if visited.insert(next) {
                    on_stack.insert(next);
                    path.push(next);
                    stack.push(frame(next));
                }
            } else {
                let finished = top.node;
                stack.pop();
                on_stack.remove(&finished);
                path.pop();
            }
        }
    }

    cycles
}

fn split_by_readiness(graph: &SprintGraph) -> (Vec<String>, Vec<String>) {
    let mut independent = Vec::new();
    let mut dependent = Vec::new();
    for idx in graph.graph.node_indices() {
        let node = &graph.graph[idx];
        if !node.in_sprint {
            continue;
        }
        // All-external dependencies still count as independent, even when
        // those dependencies are unfinished.
        let has_internal = graph
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .any(|edge| *edge.weight() == EdgeKind::Internal);
        if has_internal {
            dependent.push(node.id.clone());
        } else {
            independent.push(node.id.clone());
        }
    }
    (independent, dependent)
}

/// Independent items first, then dependent items in Kahn order over internal
/// edges. Dependencies on independent items are already satisfied by the
/// time dependent items are ordered.
fn suggest_execution_order(
    graph: &SprintGraph,
    independent: &[String],
    dependent: &[String],
) -> ExecutionOrder {
    let dependent_set: HashSet<&str> = dependent.iter().map(String::as_str).collect();
    let mut in_degree: HashMap<&str, usize> = dependent
        .iter()
        .map(|id| {
            let blocking = graph
                .dependencies(id)
                .into_iter()
                .filter(|(node, kind)| {
                    *kind == EdgeKind::Internal && dependent_set.contains(node.id.as_str())
                })
                .count();
            (id.as_str(), blocking)
        })
        .collect();

    let mut queue: VecDeque<&str> = dependent
        .iter()
        .map(String::as_str)
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut order: Vec<String> = independent.to_vec();
    let mut ordered_dependent = 0;
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        ordered_dependent += 1;
        for unblocked in graph.dependents(id) {
            if let Some(degree) = in_degree.get_mut(unblocked.id.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(unblocked.id.as_str());
                }
            }
        }
    }

    if ordered_dependent < dependent.len() {
        ExecutionOrder::CycleDetected { resolved: order }
    } else {
        ExecutionOrder::Ordered(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_assignment, build_done_assignment};
    use proptest::prelude::*;

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|o| o == id).unwrap()
    }

    #[test]
    fn empty_sprint_is_not_an_error() {
        let report = analyze_sprint_dependencies(&[]).unwrap();
        assert!(report.is_empty());
        assert!(report.cycles.is_empty());
        assert_eq!(report.execution_order, ExecutionOrder::Ordered(vec![]));
    }

    #[test]
    fn missing_issue_id_fails_validation() {
        let assignments = vec![build_assignment("A", &[]), build_assignment(" ", &[])];
        let error = analyze_sprint_dependencies(&assignments).unwrap_err();
        assert_eq!(error, AnalyzerError::MissingIssueId { position: 1 });
    }

    #[test]
    fn missing_assignee_fails_validation() {
        let mut assignment = build_assignment("A", &[]);
        assignment.assignee.name = String::new();
        let error = analyze_sprint_dependencies(&[assignment]).unwrap_err();
        assert_eq!(
            error,
            AnalyzerError::MissingAssignee {
                issue: "A".to_string()
            }
        );
    }

    #[test]
    fn external_dependency_creates_one_external_node() {
        let assignments = vec![
            build_assignment("A", &["EXT-1"]),
            build_assignment("B", &["EXT-1", "A"]),
        ];
        let report = analyze_sprint_dependencies(&assignments).unwrap();

        let external = report.graph.external_nodes();
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].id, "EXT-1");
        assert!(!external[0].in_sprint);
        assert_eq!(external[0].status, ItemStatus::external());
        assert_eq!(report.independent, vec!["A"]);
        assert_eq!(report.dependent, vec!["B"]);
    }

    #[test]
    fn external_dependency_prefers_its_own_status() {
        let mut assignment = build_assignment("A", &[]);
        assignment.item.dependencies.push(DependencyRef {
            id: "OTHER-9".to_string(),
            title: Some("Elsewhere".to_string()),
            status: Some(ItemStatus::Done),
        });
        let report = analyze_sprint_dependencies(&[assignment]).unwrap();

        let node = report.graph.node("OTHER-9").unwrap();
        assert_eq!(node.status, ItemStatus::Done);
        assert!(node.implemented);
        assert_eq!(node.title.as_deref(), Some("Elsewhere"));
    }

    #[test]
    fn dependency_on_later_listed_item_is_internal() {
        let assignments = vec![build_assignment("A", &["B"]), build_assignment("B", &[])];
        let report = analyze_sprint_dependencies(&assignments).unwrap();

        assert!(report.graph.external_nodes().is_empty());
        let deps = report.graph.dependencies("A");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].1, EdgeKind::Internal);
        assert_eq!(report.graph.dependents("B")[0].id, "A");
        assert_eq!(
            report.execution_order,
            ExecutionOrder::Ordered(vec!["B".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn independent_items_come_first_then_kahn_order() {
        let assignments = vec![
            build_assignment("D", &["C"]),
            build_assignment("C", &["A", "B"]),
            build_assignment("A", &[]),
            build_assignment("B", &["EXT"]),
        ];
        let report = analyze_sprint_dependencies(&assignments).unwrap();

        assert_eq!(report.independent, vec!["A", "B"]);
        assert_eq!(
            report.execution_order.ids(),
            &["A", "B", "C", "D"].map(String::from)
        );
    }

    #[test]
    fn done_items_are_marked_implemented() {
        let assignments = vec![build_done_assignment("A", crate::test_support::on_date(2026, 3, 2))];
        let report = analyze_sprint_dependencies(&assignments).unwrap();
        assert!(report.graph.node("A").unwrap().implemented);
    }

    #[test]
    fn cycles_are_reported_and_block_ordering() {
        let assignments = vec![
            build_assignment("A", &["B"]),
            build_assignment("B", &["A"]),
            build_assignment("C", &[]),
            build_assignment("D", &["C"]),
        ];
        let report = analyze_sprint_dependencies(&assignments).unwrap();

        assert_eq!(report.cycles, vec![vec!["A".to_string(), "B".to_string()]]);
        assert_eq!(
            report.execution_order,
            ExecutionOrder::CycleDetected {
                resolved: vec!["C".to_string(), "D".to_string()]
            }
        );
        assert!(!report.execution_order.is_complete());
    }

    #[test]
    fn disjoint_cycles_are_all_found() {
        let assignments = vec![
            build_assignment("A", &["B"]),
            build_assignment("B", &["A"]),
            build_assignment("X", &["Y"]),
            build_assignment("Y", &["Z"]),
            build_assignment("Z", &["X"]),
        ];
        let report = analyze_sprint_dependencies(&assignments).unwrap();

        assert_eq!(report.cycles.len(), 2);
        assert_eq!(report.cycles[1], vec!["X", "Y", "Z"]);
    }

    #[test]
    fn duplicate_assignments_keep_the_first_occurrence() {
        let mut second = build_assignment("A", &["B"]);
        second.assignee.name = "Someone else".to_string();
        let assignments = vec![build_assignment("A", &[]), second];
        let report = analyze_sprint_dependencies(&assignments).unwrap();

        assert_eq!(report.graph.node_count(), 1);
        assert_eq!(report.graph.node("A").unwrap().assignee.as_deref(), Some("Dev A"));
    }

    proptest! {
        #[test]
        fn acyclic_sprints_order_dependencies_first(
            size in 1usize..10,
            raw_edges in proptest::collection::vec((0usize..10, 0usize..10), 0..25),
        ) {
            let ids: Vec<String> = (0..size).map(|i| format!("S-{i}")).collect();
            let mut deps: Vec<Vec<String>> = vec![Vec::new(); size];
            for (a, b) in raw_edges {
                let (a, b) = (a % size, b % size);
                if a > b {
                    deps[a].push(ids[b].clone());
                }
            }
            let assignments: Vec<Assignment> = ids
                .iter()
                .zip(&deps)
                .map(|(id, d)| {
                    let refs: Vec<&str> = d.iter().map(String::as_str).collect();
                    build_assignment(id, &refs)
                })
                .collect();

            let report = analyze_sprint_dependencies(&assignments).unwrap();
            prop_assert!(report.cycles.is_empty());
            let order = match &report.execution_order {
                ExecutionOrder::Ordered(order) => order.clone(),
                other => return Err(TestCaseError::fail(format!("unexpected {other:?}"))),
            };
            prop_assert_eq!(order.len(), size);
            for (id, d) in ids.iter().zip(&deps) {
                for dep in d {
                    prop_assert!(position(&order, dep) < position(&order, id));
                }
            }
        }
    }
}
