//! # Factorio Core
//!
//! Platform-independent decoding of the Factorio positional audio telemetry
//! file, and the state behind Mumble's positional audio provider contract.
//!
//! This crate contains pure parsing and state logic with **no filesystem or
//! host dependencies**.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  factorio-core (platform-independent, no logging deps)     │
//! │  ├── parser/     (token:value lines → PositionRecord)      │
//! │  ├── context/    (record → context / identity strings)     │
//! │  ├── freshness/  (modification-time staleness arithmetic)  │
//! │  ├── state/      (provider phases, one-shot warning flag)  │
//! │  └── io          (TelemetrySource, HostLog traits)         │
//! └─────────────────────────────────────────────────────────────┘
//!                 ▲                           ▲
//!    ┌────────────┴────────────┐   ┌─────────┴─────────┐
//!    │  mumble-factorio        │   │ factorio-probe    │
//!    │  (plugin, C ABI)        │   │ (diagnostic CLI)  │
//!    └─────────────────────────┘   └───────────────────┘
//! ```
//!
//! ## Key Modules
//!
//! - [`parser`] - Telemetry line decoding and the record builder
//! - [`record`] - The decoded [`PositionRecord`]
//! - [`context`] - Context and identity tokens for the host
//! - [`freshness`] - Staleness checks on modification times
//! - [`positional`] - [`PositionalData`] and [`ProbeOutcome`]
//! - [`state`] - Provider state machine
//! - [`io`] - Traits the plugin implements ([`TelemetrySource`], [`HostLog`])
//!
//! ## Example: Decoding a Telemetry File
//!
//! ```rust
//! use factorio_core::{parser, HostContext};
//!
//! let text = "XYZ header\nx:1.5\ny:-2.0\nz:0.25\np:3\nu:7\ns:hostplayer\n";
//! let record = parser::parse_str(text).unwrap();
//! let ctx = HostContext::from(&record);
//! assert_eq!(ctx.context, "hostplayer/7");
//! assert_eq!(ctx.identity, "3");
//! ```

pub mod context;
pub mod error;
pub mod freshness;
pub mod io;
pub mod parser;
pub mod positional;
pub mod record;
pub mod state;

// Re-export commonly used types
pub use context::HostContext;
pub use error::{ParseError, TelemetryError};
pub use io::{HostLog, HostLogError, TelemetrySource, TelemetrySourceExt};
pub use parser::Token;
pub use positional::{PositionalData, ProbeOutcome, ZERO_VECTOR};
pub use record::PositionRecord;
pub use state::{ProbeVerdict, ProviderPhase, ProviderState};
