use sdnwatch_client::ClientError;
use sdnwatch_types::{MetricsSnapshot, TopologySnapshot, TrafficStatus};

use crate::control::{Command, CommandReply};

/// Result of one background request, delivered to the UI thread.
#[derive(Debug)]
pub enum Update {
    /// A metrics poll. `sequence` increases with every request issued.
    Metrics {
        sequence: u64,
        result: Result<MetricsSnapshot, ClientError>,
    },
    Topology(Result<TopologySnapshot, ClientError>),
    /// Traffic status fetched once at load.
    TrafficStatus(Result<TrafficStatus, ClientError>),
    Command {
        command: Command,
        result: Result<CommandReply, ClientError>,
    },
}

impl Update {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Update::Metrics { .. } => "metrics",
            Update::Topology(_) => "topology",
            Update::TrafficStatus(_) => "traffic-status",
            Update::Command { .. } => "command",
        }
    }
}
