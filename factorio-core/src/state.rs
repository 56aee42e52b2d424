//! Provider state machine (pure, no I/O).
//!
//! ```text
//!              probe: game not running
//!   ┌──────────┐ ◄──────────────────────────────┐
//!   │ Inactive │ ──probe──► Probing ──ok──► Providing
//!   └──────────┘               │
//!        ▲                     ├──absent/stale──► UnavailableTemporary
//!        │                     └──no locator────► UnavailablePermanent
//!        └──────────── shutdown (from any phase)
//! ```
//!
//! The plugin drives the transitions from its probe/fetch/shutdown handlers.
//! [`ProviderState`] also remembers whether the user has been told to install
//! the telemetry mod; that flag survives positional shutdown and is only
//! cleared by building a new state (a full plugin restart).

use serde::{Deserialize, Serialize};

use crate::positional::ProbeOutcome;

// =============================================================================
// Provider Phase
// =============================================================================

/// Where the provider is in the host's probe → fetch → shutdown cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProviderPhase {
    /// No successful probe this session
    #[default]
    Inactive,
    /// Availability check running
    Probing,
    /// A probe returned ok; fetches are expected
    Providing,
    /// Game running but telemetry absent or stale
    UnavailableTemporary,
    /// Telemetry can never be located in this session
    UnavailablePermanent,
}

impl ProviderPhase {
    /// Whether the host has been told data is available.
    pub fn is_providing(&self) -> bool {
        matches!(self, ProviderPhase::Providing)
    }
}

impl std::fmt::Display for ProviderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderPhase::Inactive => write!(f, "Inactive"),
            ProviderPhase::Probing => write!(f, "Probing"),
            ProviderPhase::Providing => write!(f, "Providing"),
            ProviderPhase::UnavailableTemporary => write!(f, "Unavailable (temporary)"),
            ProviderPhase::UnavailablePermanent => write!(f, "Unavailable (permanent)"),
        }
    }
}

// =============================================================================
// Why a probe failed
// =============================================================================

/// The reason behind a probe answer, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeVerdict {
    /// Game running, telemetry present and fresh
    Available,
    /// No monitored executable in the host's process list
    GameNotRunning,
    /// Game running but the telemetry file does not exist
    ModMissing,
    /// Game running, file present but not recently written
    Stale,
    /// The telemetry path could not be resolved
    NoLocation,
}

impl ProbeVerdict {
    /// The host signal for this verdict.
    pub fn outcome(&self) -> ProbeOutcome {
        match self {
            ProbeVerdict::Available => ProbeOutcome::Ok,
            ProbeVerdict::GameNotRunning | ProbeVerdict::ModMissing | ProbeVerdict::Stale => {
                ProbeOutcome::TemporarilyUnavailable
            }
            ProbeVerdict::NoLocation => ProbeOutcome::PermanentlyUnavailable,
        }
    }

    /// The phase the provider rests in after this verdict.
    pub fn phase(&self) -> ProviderPhase {
        match self {
            ProbeVerdict::Available => ProviderPhase::Providing,
            ProbeVerdict::GameNotRunning => ProviderPhase::Inactive,
            ProbeVerdict::ModMissing | ProbeVerdict::Stale => ProviderPhase::UnavailableTemporary,
            ProbeVerdict::NoLocation => ProviderPhase::UnavailablePermanent,
        }
    }
}

// =============================================================================
// Provider State
// =============================================================================

/// State kept across host calls for one plugin lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderState {
    phase: ProviderPhase,
    notified_missing_mod: bool,
}

impl ProviderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ProviderPhase {
        self.phase
    }

    /// Whether the "install the mod" warning has been shown.
    pub fn notified_missing_mod(&self) -> bool {
        self.notified_missing_mod
    }

    // -------------------------------------------------------------------------
    // State Transitions
    // -------------------------------------------------------------------------

    /// Enter `Probing` at the start of an availability check.
    pub fn begin_probe(&mut self) {
        self.phase = ProviderPhase::Probing;
    }

    /// Settle after a probe and return the host signal.
    pub fn finish_probe(&mut self, verdict: ProbeVerdict) -> ProbeOutcome {
        self.phase = verdict.phase();
        verdict.outcome()
    }

    /// Claim the one-shot missing-mod warning.
    ///
    /// Returns `true` exactly once per state lifetime; the caller should emit
    /// the warning only then.
    pub fn take_missing_mod_notice(&mut self) -> bool {
        !std::mem::replace(&mut self.notified_missing_mod, true)
    }

    /// Return to `Inactive`. The missing-mod flag is kept.
    pub fn shutdown(&mut self) {
        self.phase = ProviderPhase::Inactive;
    }
}

// =============================================================================
// Tests
// =============================================================================
