//! Replies to the control endpoints.

use crate::OperatingMode;

/// Reply of `GET /api/traffic-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficStatus {
    #[cfg_attr(feature = "serde", serde(default))]
    pub running: bool,
}

/// Reply of the fire-and-forget commands (`start-traffic`, `stop`, `congest`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommandStatus {
    pub status: Option<String>,
}

/// Reply of `GET /api/mode/:mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    pub mode: OperatingMode,
}

/// Reply of `POST /api/save-charts`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SavedCharts {
    /// Paths the backend wrote, one per uploaded image.
    pub saved: Vec<String>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_control_replies() {
        let status: TrafficStatus = serde_json::from_str(r#"{"running": true}"#).unwrap();
        assert!(status.running);

        let ack: CommandStatus = serde_json::from_str(r#"{"status": "stopped"}"#).unwrap();
        assert_eq!(ack.status.as_deref(), Some("stopped"));

        let mode: ModeChange = serde_json::from_str(r#"{"mode": "proposed"}"#).unwrap();
        assert_eq!(mode.mode, OperatingMode::Proposed);

        let saved: SavedCharts =
            serde_json::from_str(r#"{"saved": ["/r/a_throughput.png", "/r/a_ewma.png"]}"#)
                .unwrap();
        assert_eq!(saved.saved.len(), 2);
    }
}
