//! Topology snapshot returned by `GET /api/topology`.

#[cfg(feature = "serde")]
use crate::de::{lenient, lenient_or_default};

/// Switches and links as the controller currently sees them.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TopologySnapshot {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient_or_default"))]
    pub nodes: Vec<TopologyNode>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient_or_default"))]
    pub links: Vec<TopologyLink>,
    /// Ids of links the rerouting module has moved traffic onto.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient_or_default"))]
    pub rerouted_links: Vec<String>,
}

impl TopologySnapshot {
    /// Whether the link with this id is flagged as rerouted.
    pub fn is_rerouted(&self, link_id: &str) -> bool {
        self.rerouted_links.iter().any(|id| id == link_id)
    }
}

/// A switch or host in the topology.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologyNode {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient_or_default"))]
    pub label: String,
}

/// A directed link between two nodes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologyLink {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Fraction of link capacity in use.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient_or_default"))]
    pub utilization: f64,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub rate_mbps: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient_or_default"))]
    pub congested: bool,
}
