//! # sdnwatch-types
//!
//! Payload types for the SDN control center dashboard API. Every JSON body
//! the backend returns has a model here, so the client crate and the TUI
//! agree on one schema.
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for all payloads
//!
//! ## Tolerant decoding
//!
//! The backend is loose about which fields it sends. Every metric field is an
//! `Option` defaulting to `None`, so a snapshot with missing keys still
//! decodes. A field that is `null` or of the wrong type decodes as if it
//! were missing; counts sent as floats are rounded. Consumers decide what a
//! missing value means.
//!
//! ```rust
//! # #[cfg(feature = "serde")]
//! # fn main() {
//! use sdnwatch_types::{BackendState, MetricsSnapshot};
//!
//! let snapshot: MetricsSnapshot =
//!     serde_json::from_str(r#"{"throughput_baseline": 12.5, "state": "SAFE"}"#).unwrap();
//! assert_eq!(snapshot.throughput_baseline, Some(12.5));
//! assert_eq!(snapshot.state, Some(BackendState::Safe));
//! assert!(snapshot.flows.is_none());
//! # }
//! # #[cfg(not(feature = "serde"))]
//! # fn main() {}
//! ```

mod control;
#[cfg(feature = "serde")]
mod de;
mod metrics;
mod state;
mod topology;

pub use control::*;
pub use metrics::*;
pub use state::*;
pub use topology::*;
