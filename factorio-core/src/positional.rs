//! Host-facing positional types
//!
//! These mirror what Mumble's positional audio API exchanges with a plugin,
//! as owned Rust values. The plugin crate converts them to the C ABI.

use serde::{Deserialize, Serialize};

use crate::context::HostContext;
use crate::record::PositionRecord;

/// A vector the bridge has no data for.
pub const ZERO_VECTOR: [f32; 3] = [0.0, 0.0, 0.0];

// =============================================================================
// Probe Outcome
// =============================================================================

/// Answer to the host's "can you provide positional data?" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeOutcome {
    /// Data can be fetched now
    Ok,
    /// Not now; the host should ask again later
    TemporarilyUnavailable,
    /// Never in this session
    PermanentlyUnavailable,
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Ok => write!(f, "Ok"),
            ProbeOutcome::TemporarilyUnavailable => write!(f, "Temporarily Unavailable"),
            ProbeOutcome::PermanentlyUnavailable => write!(f, "Permanently Unavailable"),
        }
    }
}

// =============================================================================
// Positional Data
// =============================================================================

/// Everything a successful fetch hands to the host.
///
/// "Avatar" is where the player's voice comes from, "camera" is where the
/// local listener hears from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalData {
    pub avatar_position: [f32; 3],
    pub avatar_direction: [f32; 3],
    pub avatar_axis: [f32; 3],
    pub camera_position: [f32; 3],
    pub camera_direction: [f32; 3],
    pub camera_axis: [f32; 3],
    pub context: String,
    pub identity: String,
}

impl From<&PositionRecord> for PositionalData {
    /// Factorio has no facing direction we can read, so every direction and
    /// axis vector is zero. The listener stands where the player stands.
    fn from(record: &PositionRecord) -> Self {
        let HostContext { context, identity } = HostContext::from(record);
        let position = record.position();
        // The listener hears from the player's own position.
        Self {
            avatar_position: position,
            avatar_direction: ZERO_VECTOR,
            avatar_axis: ZERO_VECTOR,
            camera_position: position,
            camera_direction: ZERO_VECTOR,
            camera_axis: ZERO_VECTOR,
            context,
            identity,
        }
    }
}
