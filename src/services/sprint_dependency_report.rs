use crate::services::dependency_graph::{mermaid_label, mermaid_node_id};
use crate::services::sprint_dependency_analyzer::{
    EdgeKind, ExecutionOrder, GraphNode, SprintDependencyReport,
};

pub fn generate_dependency_markdown(report: &SprintDependencyReport) -> String {
    if report.is_empty() {
        return "# Sprint Dependencies\n\nNo assignments to analyze.\n".to_string();
    }

    let diagram = generate_dependency_diagram(report);
    let cycles = generate_cycle_report(report);
    let table = generate_execution_table(report);
    format!(
        "# Sprint Dependencies\n```mermaid\n{diagram}\n```\n\n## Circular Dependencies\n{cycles}\n\n## Execution Order\n{table}\n"
    )
}

pub fn generate_dependency_diagram(report: &SprintDependencyReport) -> String {
    let mut lines = vec![
        "flowchart TD".to_string(),
        "    classDef pending fill:#fff3cd,stroke:#d39e00".to_string(),
        "    classDef done fill:#d4edda,stroke:#28a745".to_string(),
        "    classDef external fill:#e2e3e5,stroke:#6c757d,stroke-dasharray: 5 5".to_string(),
    ];

    for node in report.graph.nodes() {
        lines.push(format!(
            "    {}[\"{}\"]:::{}",
            mermaid_node_id(&node.id),
            mermaid_label(&node.id, node.title.as_deref().unwrap_or_default()),
            node_class(node)
        ));
    }

    for node in report.graph.nodes() {
        for (dependency, kind) in report.graph.dependencies(&node.id) {
            let arrow = match kind {
                EdgeKind::Internal => "-->",
                EdgeKind::External => "-.->",
            };
            lines.push(format!(
                "    {} {arrow} {}",
                mermaid_node_id(&dependency.id),
                mermaid_node_id(&node.id)
            ));
        }
    }

    lines.join("\n")
}

fn node_class(node: &GraphNode) -> &'static str {
    if !node.in_sprint {
        "external"
    } else if node.implemented {
        "done"
    } else {
        "pending"
    }
}

pub fn generate_cycle_report(report: &SprintDependencyReport) -> String {
    if report.cycles.is_empty() {
        return "No circular dependencies detected.".to_string();
    }

    let mut lines = vec![format!(
        "{} circular dependency chain(s) found:",
        report.cycles.len()
    )];
    for cycle in &report.cycles {
        let mut chain = cycle.clone();
        if let Some(first) = cycle.first() {
            chain.push(first.clone());
        }
        lines.push(format!("- {}", chain.join(" → ")));
    }
    lines.join("\n")
}

/// Items in suggested order. When a cycle blocks ordering, the unordered
/// items follow with `-` in the order column.
pub fn generate_execution_table(report: &SprintDependencyReport) -> String {
    let mut lines = vec![
        "| Order | ID | Title | Assignee | Status | Dependencies |".to_string(),
        "|-------|----|-------|----------|--------|--------------|".to_string(),
    ];

    let ordered = report.execution_order.ids();
    for (position, id) in ordered.iter().enumerate() {
        if let Some(node) = report.graph.node(id) {
            lines.push(table_row(report, &(position + 1).to_string(), node));
        }
    }
    if let ExecutionOrder::CycleDetected { resolved } = &report.execution_order {
        for node in report.graph.nodes() {
            if node.in_sprint && !resolved.contains(&node.id) {
                lines.push(table_row(report, "-", node));
            }
        }
    }

    lines.join("\n")
}

fn table_row(report: &SprintDependencyReport, order: &str, node: &GraphNode) -> String {
    format!(
        "| {order} | {} | {} | {} | {} | {} |",
        node.id,
        node.title.as_deref().unwrap_or_default(),
        node.assignee.as_deref().unwrap_or("-"),
        node.status,
        dependency_annotations(report, &node.id)
    )
}

fn dependency_annotations(report: &SprintDependencyReport, id: &str) -> String {
    let annotated: Vec<String> = report
        .graph
        .dependencies(id)
        .into_iter()
        .map(|(dependency, kind)| {
            let mut text = dependency.id.clone();
            if dependency.implemented {
                text.push_str(" ✓");
            }
            if kind == EdgeKind::External {
                text.push_str(" ⚠");
            }
            text
        })
        .collect();

    if annotated.is_empty() {
        "-".to_string()
    } else {
        annotated.join(", ")
    }
}
