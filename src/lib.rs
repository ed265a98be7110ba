//! # sdnwatch
//!
//! A terminal dashboard and library for the SDN congestion control testbed.
//!
//! The backend exposes live metrics, a topology snapshot and a handful of
//! control endpoints over HTTP. This crate polls those endpoints, keeps a
//! sliding window of every series, marks the onset of congestion episodes,
//! and renders everything in an interactive terminal UI. A headless watch
//! mode prints one line per poll instead.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Application                         │
//! │  ┌─────────┐   Update    ┌──────────┐    ┌─────────┐         │
//! │  │ source  │ ──────────▶ │   app    │ ──▶│   ui    │──▶ Terminal
//! │  │ (tasks) │   (mpsc)    │ (Session)│    │         │         │
//! │  └────┬────┘             └────┬─────┘    └─────────┘         │
//! │       │                       │                              │
//! │       ▼                       ▼                              │
//! │  ┌─────────┐             ┌──────────┐                        │
//! │  │ Backend │◀─ control ──│ Controls │                        │
//! │  │ (HTTP)  │             └──────────┘                        │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`Backend`] trait and the metrics/topology schedules
//! - **[`data`]**: series buffers, mode projection, markers, topology graph
//! - **[`session`]**: all live dashboard state, mutated only by the UI thread
//! - **[`control`]**: control commands, enablement and the mode cooldown
//! - **[`app`]**: wiring of the above plus view navigation
//! - **[`ui`]**: ratatui rendering
//! - **[`export`]**: PNG rendering of the charts for the save-charts endpoint
//! - **[`record`]**: JSON-lines recording of polls
//! - **[`watch`]**: the headless console monitor
//!
//! ## Usage
//!
//! ```bash
//! # Dashboard against a local backend
//! sdnwatch --url http://127.0.0.1:5000
//!
//! # Headless, exiting once the network has been SAFE for 3 polls
//! sdnwatch --watch --exit-when-safe 3
//! ```
//!
//! ### As a library
//!
//! ```
//! use sdnwatch::Session;
//! use sdnwatch_types::{BackendState, MetricsSnapshot};
//!
//! let mut session = Session::new(25);
//! let snapshot = MetricsSnapshot {
//!     throughput_baseline: Some(42.0),
//!     state: Some(BackendState::Safe),
//!     ..Default::default()
//! };
//! session.apply_metrics(1, &snapshot, "12:00:00");
//! assert_eq!(session.state(), Some(&BackendState::Safe));
//! ```

pub mod app;
pub mod config;
pub mod control;
pub mod data;
pub mod events;
pub mod export;
pub mod logging;
pub mod record;
pub mod session;
pub mod source;
pub mod ui;
pub mod watch;

pub use app::{App, AppOptions, View};
pub use config::Settings;
pub use control::{Command, Controls, Rejection};
pub use data::{ChartKind, SeriesBuffer, SeriesKey};
pub use record::Recorder;
pub use session::Session;
pub use source::{Backend, MetricsPoller, TopologyRefresher, Update};
