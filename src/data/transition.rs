//! Edge detection on the backend state stream.

use sdnwatch_types::BackendState;

/// A change between two consecutive observed states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: BackendState,
    pub to: BackendState,
}

impl Transition {
    /// True when this edge opens a congestion episode.
    pub fn enters_congestion(&self) -> bool {
        !self.from.is_congestion() && self.to.is_congestion()
    }
}

/// Remembers the previous state only to detect edges.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    last: Option<BackendState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state`; returns the edge if it differs from the previous one.
    /// The very first observation is never an edge.
    pub fn observe(&mut self, state: &BackendState) -> Option<Transition> {
        let previous = self.last.replace(state.clone())?;
        if previous == *state {
            return None;
        }
        Some(Transition {
            from: previous,
            to: state.clone(),
        })
    }

    pub fn current(&self) -> Option<&BackendState> {
        self.last.as_ref()
    }
}
