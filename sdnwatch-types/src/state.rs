//! Operating mode and backend congestion state.

use std::fmt;
use std::str::FromStr;

/// Which routing configuration the controller is running.
///
/// The backend tracks baseline and proposed metrics side by side; the mode
/// decides which of the two the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OperatingMode {
    /// Shortest-path forwarding without congestion avoidance.
    #[default]
    Baseline,
    /// EWMA-predicted congestion avoidance with rerouting.
    Proposed,
}

impl OperatingMode {
    /// Path segment used by `/api/mode/:mode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Baseline => "baseline",
            OperatingMode::Proposed => "proposed",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode string is neither `baseline` nor `proposed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operating mode: {}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for OperatingMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(OperatingMode::Baseline),
            "proposed" => Ok(OperatingMode::Proposed),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Congestion state reported by the backend on every metrics poll.
///
/// Values the dashboard does not know about are kept verbatim in
/// [`BackendState::Other`] so newer backends do not break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum BackendState {
    Safe,
    PredictedCongestion,
    Congested,
    Other(String),
}

impl BackendState {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            BackendState::Safe => "SAFE",
            BackendState::PredictedCongestion => "PREDICTED_CONGESTION",
            BackendState::Congested => "CONGESTED",
            BackendState::Other(s) => s,
        }
    }

    /// True for the states that open a congestion episode.
    pub fn is_congestion(&self) -> bool {
        matches!(
            self,
            BackendState::PredictedCongestion | BackendState::Congested
        )
    }
}

impl From<String> for BackendState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SAFE" => BackendState::Safe,
            "PREDICTED_CONGESTION" => BackendState::PredictedCongestion,
            "CONGESTED" => BackendState::Congested,
            _ => BackendState::Other(s),
        }
    }
}

impl From<&str> for BackendState {
    fn from(s: &str) -> Self {
        BackendState::from(s.to_string())
    }
}

impl From<BackendState> for String {
    fn from(state: BackendState) -> Self {
        match state {
            BackendState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
