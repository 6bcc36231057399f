//! Text outline of a map for terminal output
//!
//! Nodes are listed as a tree below the root, followed by sibling links and
//! any nodes that hang outside the tree. Colors use ANSI escape codes via
//! crossterm.

use crossterm::style::{Color, Stylize};
use searchmap::{Graph, Node, NodeId};
use std::collections::BTreeSet;

/// Render the outline of `graph`, with colors when `colored` is set
pub fn render_outline(graph: &Graph, colored: bool) -> String {
    let paint = Painter { colored };
    let mut lines = Vec::new();
    let mut visited = BTreeSet::new();

    if let Some(root) = graph.root().and_then(|id| graph.node(id)) {
        lines.push(paint.root_line(root));
        visited.insert(root.id());
        walk(graph, root, "", &paint, &mut visited, &mut lines);
    }

    let mut links = Vec::new();
    for node in graph.nodes() {
        for other in node.siblings() {
            if node.owns_sibling_connection(other) == Some(true) {
                links.push(format!(
                    "  {} ~ {}",
                    paint.id(node.id()),
                    paint.id(other)
                ));
            }
        }
    }
    if !links.is_empty() {
        lines.push(paint.heading("siblings:"));
        lines.extend(links);
    }

    let detached: Vec<&Node> = graph
        .nodes()
        .filter(|n| !visited.contains(&n.id()) && n.parent().is_none())
        .collect();
    if !detached.is_empty() {
        lines.push(paint.heading("detached:"));
        for node in detached {
            lines.push(format!("  {}", paint.node(node)));
            visited.insert(node.id());
            walk(graph, node, "  ", &paint, &mut visited, &mut lines);
        }
    }

    lines.join("\n")
}

fn walk(
    graph: &Graph,
    node: &Node,
    prefix: &str,
    paint: &Painter,
    visited: &mut BTreeSet<NodeId>,
    lines: &mut Vec<String>,
) {
    let children: Vec<&Node> = node
        .children()
        .filter_map(|id| graph.node(id))
        .filter(|child| !visited.contains(&child.id()))
        .collect();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{}{}{}", prefix, paint.edge(branch), paint.node(child)));
        visited.insert(child.id());
        walk(
            graph,
            child,
            &format!("{}{}", prefix, paint.edge(indent)),
            paint,
            visited,
            lines,
        );
    }
}

struct Painter {
    colored: bool,
}

impl Painter {
    fn with(&self, text: &str, color: Color) -> String {
        if self.colored {
            format!("{}", text.with(color))
        } else {
            text.to_string()
        }
    }

    fn id(&self, id: NodeId) -> String {
        self.with(&id.to_string(), Color::Cyan)
    }

    fn edge(&self, text: &str) -> String {
        self.with(text, Color::DarkGrey)
    }

    fn heading(&self, text: &str) -> String {
        self.with(text, Color::Magenta)
    }

    fn node(&self, node: &Node) -> String {
        format!(
            "{} {} {} {}",
            self.id(node.id()),
            self.with(&format!("[{}]", node.kind().tag()), Color::Yellow),
            node.kind().summary(),
            node.location()
        )
    }

    fn root_line(&self, node: &Node) -> String {
        format!("{} {}", self.node(node), self.with("(root)", Color::Green))
    }
}
