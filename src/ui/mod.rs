//! Terminal rendering with ratatui.
//!
//! - [`common`]: header, tabs, status bar, help and alert overlays
//! - [`charts`]: the time-series charts and top ports bars
//! - [`topology`]: link table and node list
//! - [`markers`]: congestion marker list
//! - [`theme`]: colors, including the series palette shared with PNG export

pub mod charts;
pub mod common;
pub mod markers;
pub mod theme;
pub mod topology;

pub use theme::Theme;
