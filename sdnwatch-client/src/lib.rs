//! # sdnwatch-client
//!
//! Async HTTP client for the SDN control center backend.
//!
//! The backend is a small Flask service in front of the SDN controller. It
//! exposes live metrics, the current topology and a handful of control
//! commands. This crate wraps each endpoint in one method and maps every
//! failure onto [`ClientError`]. It never retries: callers decide whether a
//! failed request matters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sdnwatch_client::BackendClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::builder()
//!         .endpoint("http://127.0.0.1:5000")
//!         .timeout(Duration::from_secs(3))
//!         .build()?;
//!
//!     let metrics = client.metrics().await?;
//!     println!("state: {:?}", metrics.state);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;

pub use backend::{BackendClient, BackendClientBuilder, ChartImage};
pub use error::ClientError;

// Re-export types for convenience
pub use sdnwatch_types::{
    BackendState, CommandStatus, MetricsSnapshot, ModeChange, OperatingMode, PortUtilization,
    SavedCharts, TopologyLink, TopologyNode, TopologySnapshot, TrafficStatus,
};
