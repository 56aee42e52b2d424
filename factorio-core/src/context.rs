//! Host-facing context and identity tokens
//!
//! Mumble only lets users hear each other positionally when their plugin
//! context strings match, so players on different servers or surfaces are
//! kept apart. The identity distinguishes players within one context.

use serde::Serialize;

use crate::record::PositionRecord;

/// The pair of opaque strings handed to the host with every position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    /// `<server_name>/<surface_id>`
    pub context: String,
    /// `<player_id>`
    pub identity: String,
}

impl From<&PositionRecord> for HostContext {
    fn from(record: &PositionRecord) -> Self {
        let (context, identity) = format(record);
        Self { context, identity }
    }
}

/// Derive `(context, identity)` from a record.
///
/// The server name is passed through untouched.
pub fn format(record: &PositionRecord) -> (String, String) {
    (
        format!("{}/{}", record.server_name, record.surface_id),
        record.player_id.to_string(),
    )
}
