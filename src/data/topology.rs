//! Topology graph state and link styling.
//!
//! Nodes accumulate across refreshes (merged by id, updated in place).
//! Links are replaced wholesale on every refresh, so a link that disappears
//! from the backend disappears from the view.

use std::collections::BTreeMap;

use sdnwatch_types::{TopologyLink, TopologySnapshot};

/// Rates at or below this many Mbps are shown as utilization instead.
const RATE_LABEL_THRESHOLD_MBPS: f64 = 0.01;

/// How a link is drawn. Rerouted wins over congested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Normal,
    Congested,
    Rerouted,
}

impl EdgeStyle {
    /// Line width in the original graph rendering, reused as emphasis.
    pub fn width(self) -> u8 {
        match self {
            EdgeStyle::Normal => 2,
            EdgeStyle::Congested => 3,
            EdgeStyle::Rerouted => 4,
        }
    }
}

/// A node as currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub id: String,
    pub label: String,
}

/// A link as currently rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: String,
    pub style: EdgeStyle,
    pub utilization: f64,
}

impl EdgeView {
    fn from_link(link: &TopologyLink, rerouted: bool) -> Self {
        let style = if rerouted {
            EdgeStyle::Rerouted
        } else if link.congested {
            EdgeStyle::Congested
        } else {
            EdgeStyle::Normal
        };

        let mut label = link_label(link);
        if rerouted {
            label = format!("REROUTED {}", label);
        }

        Self {
            id: link.id.clone(),
            from: link.from.clone(),
            to: link.to.clone(),
            label,
            style,
            utilization: link.utilization,
        }
    }

    pub fn width(&self) -> u8 {
        self.style.width()
    }
}

/// Rate in Mbps when meaningful, otherwise utilization percent.
pub fn link_label(link: &TopologyLink) -> String {
    match link.rate_mbps {
        Some(rate) if rate > RATE_LABEL_THRESHOLD_MBPS => format!("{:.2} Mbps", rate),
        _ => format!("{}%", (link.utilization * 100.0).round() as i64),
    }
}

/// Rendered topology.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    nodes: BTreeMap<String, NodeView>,
    edges: Vec<EdgeView>,
    refreshes: u64,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge nodes by id and replace the full edge set.
    pub fn apply(&mut self, snapshot: &TopologySnapshot) {
        for node in &snapshot.nodes {
            let entry = self.nodes.entry(node.id.clone()).or_insert_with(|| NodeView {
                id: node.id.clone(),
                label: String::new(),
            });
            entry.label = if node.label.is_empty() {
                node.id.clone()
            } else {
                node.label.clone()
            };
        }

        self.edges = snapshot
            .links
            .iter()
            .map(|link| EdgeView::from_link(link, snapshot.is_rerouted(&link.id)))
            .collect();
        self.refreshes += 1;
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeView> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[EdgeView] {
        &self.edges
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeView> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Node label for display, falling back to the raw id.
    pub fn node_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.nodes.get(id).map(|n| n.label.as_str()).unwrap_or(id)
    }

    /// Number of successful refreshes applied so far.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}
