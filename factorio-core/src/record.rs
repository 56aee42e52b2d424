//! Decoded telemetry snapshot
//!
//! A [`PositionRecord`] only exists fully populated. The parser builds one
//! through [`RecordBuilder`](crate::parser::RecordBuilder), which refuses to
//! produce a record while any field is missing.

use serde::{Deserialize, Serialize};

/// The local player's position and session identity at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    /// World X coordinate (tiles)
    pub x: f32,
    /// World Y coordinate (tiles)
    pub y: f32,
    /// World Z coordinate
    pub z: f32,
    /// Factorio player index
    pub player_id: i32,
    /// Surface (map) index the player is on
    pub surface_id: i32,
    /// Host/owner identity of the multiplayer session
    pub server_name: String,
}

impl PositionRecord {
    /// The world position as a host vector.
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_vector() {
        let record = PositionRecord {
            x: 1.5,
            y: -2.0,
            z: 0.25,
            player_id: 3,
            surface_id: 7,
            server_name: "hostplayer".to_string(),
        };
        assert_eq!(record.position(), [1.5, -2.0, 0.25]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = PositionRecord {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            player_id: 1,
            surface_id: 2,
            server_name: "srv".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["playerId"], 1);
        assert_eq!(json["surfaceId"], 2);
        assert_eq!(json["serverName"], "srv");
    }
}
