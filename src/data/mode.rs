//! Mode-dependent series visibility.

use sdnwatch_types::OperatingMode;

use super::series::{SeriesKey, Variant};

/// Visibility of each series under `mode`, in the order given.
///
/// Baseline series show only in baseline mode, proposed series only in
/// proposed mode, unpaired series always.
pub fn project(mode: OperatingMode, keys: &[SeriesKey]) -> Vec<(SeriesKey, bool)> {
    keys.iter().map(|k| (*k, is_visible(mode, *k))).collect()
}

pub fn is_visible(mode: OperatingMode, key: SeriesKey) -> bool {
    match key.variant() {
        Variant::Baseline => mode == OperatingMode::Baseline,
        Variant::Proposed => mode == OperatingMode::Proposed,
        Variant::Unpaired => true,
    }
}

/// Holds the session's operating mode and answers visibility queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeProjector {
    mode: OperatingMode,
}

impl ModeProjector {
    pub fn new(mode: OperatingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OperatingMode) {
        self.mode = mode;
    }

    pub fn project(&self, keys: &[SeriesKey]) -> Vec<(SeriesKey, bool)> {
        project(self.mode, keys)
    }

    pub fn is_visible(&self, key: SeriesKey) -> bool {
        is_visible(self.mode, key)
    }

    /// Visible subset of `keys`, order preserved.
    pub fn visible<'a>(&'a self, keys: &'a [SeriesKey]) -> impl Iterator<Item = SeriesKey> + 'a {
        keys.iter().copied().filter(move |k| self.is_visible(*k))
    }
}
