//! Positional Provider
//!
//! Drives [`ProviderState`] from Mumble's probe / fetch / shutdown calls.
//! One provider is one plugin session: the missing-mod warning is shown at
//! most once for its whole lifetime, however often positional audio is
//! started and stopped.

use log::{debug, info, warn};
use std::time::Duration;

use factorio_core::freshness::effective_max_age;
use factorio_core::{
    HostLog, PositionalData, ProbeOutcome, ProbeVerdict, ProviderPhase, ProviderState,
    TelemetryError, TelemetrySource, TelemetrySourceExt,
};

use crate::config::{PluginConfig, DEFAULT_GAME_EXECUTABLES};
use crate::locator;
use crate::telemetry_file::TelemetryFile;

/// Shown in the Mumble console when Factorio runs without the telemetry mod.
pub const MISSING_MOD_WARNING: &str =
    "Factorio positional audio mod not installed. Please install it to use positional audio.";

/// Tunables for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub max_age: Duration,
    pub game_executables: Vec<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            max_age: effective_max_age(0),
            game_executables: DEFAULT_GAME_EXECUTABLES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl From<&PluginConfig> for ProviderSettings {
    fn from(config: &PluginConfig) -> Self {
        Self {
            max_age: config.max_age(),
            game_executables: config.game_executables.clone(),
        }
    }
}

/// The positional audio provider for one plugin session.
///
/// `source` holds the locator's verdict: a telemetry source, or the reason
/// none could be found. The latter makes every probe answer "permanently
/// unavailable".
#[derive(Debug)]
pub struct PositionalProvider<S> {
    source: Result<S, TelemetryError>,
    settings: ProviderSettings,
    state: ProviderState,
}

impl PositionalProvider<TelemetryFile> {
    /// Locate the telemetry file as configured.
    pub fn from_config(config: &PluginConfig) -> Self {
        let source = locator::resolve(config).map(TelemetryFile::new);
        match &source {
            Ok(file) => info!("Reading Factorio telemetry from {}", file.path().display()),
            Err(e) => warn!("{}", e),
        }
        Self::new(source, ProviderSettings::from(config))
    }
}

impl<S: TelemetrySource> PositionalProvider<S> {
    pub fn new(source: Result<S, TelemetryError>, settings: ProviderSettings) -> Self {
        Self {
            source,
            settings,
            state: ProviderState::new(),
        }
    }

    pub fn phase(&self) -> ProviderPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &ProviderState {
        &self.state
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn source(&self) -> Result<&S, &TelemetryError> {
        self.source.as_ref()
    }

    /// Whether any of `programs` is a monitored game executable.
    ///
    /// Names are compared ASCII case-insensitively.
    pub fn is_game_running<N: AsRef<str>>(&self, programs: &[N]) -> bool {
        programs.iter().any(|program| {
            self.settings
                .game_executables
                .iter()
                .any(|exe| exe.eq_ignore_ascii_case(program.as_ref()))
        })
    }

    /// Answer Mumble's "can you provide positional data now?" question.
    pub fn probe<N: AsRef<str>>(&mut self, programs: &[N], host: &dyn HostLog) -> ProbeOutcome {
        self.state.begin_probe();
        let verdict = self.assess(programs, host);
        let outcome = self.state.finish_probe(verdict);
        debug!("Probe: {:?} -> {}", verdict, outcome);
        outcome
    }

    fn assess<N: AsRef<str>>(&mut self, programs: &[N], host: &dyn HostLog) -> ProbeVerdict {
        let source = match &self.source {
            Ok(source) => source,
            Err(_) => return ProbeVerdict::NoLocation,
        };

        if !self.is_game_running(programs) {
            return ProbeVerdict::GameNotRunning;
        }

        match source.check(self.settings.max_age) {
            Ok(()) => ProbeVerdict::Available,
            Err(TelemetryError::FileAbsent) => {
                if self.state.take_missing_mod_notice() {
                    if let Err(e) = host.log(MISSING_MOD_WARNING) {
                        warn!("Could not show missing mod warning: {}", e);
                    }
                }
                ProbeVerdict::ModMissing
            }
            Err(_) => ProbeVerdict::Stale,
        }
    }

    /// Read the current position, or say why there is none.
    pub fn try_fetch(&self) -> Result<PositionalData, TelemetryError> {
        let source = self.source.as_ref().map_err(Clone::clone)?;
        let record = source.fetch_record(self.settings.max_age)?;
        Ok(PositionalData::from(&record))
    }

    /// Read the current position; `None` means "no data this tick".
    pub fn fetch(&self) -> Option<PositionalData> {
        match self.try_fetch() {
            Ok(data) => Some(data),
            Err(e) => {
                debug!("Fetch failed: {}", e);
                None
            }
        }
    }

    /// End the positional session. The missing-mod warning is not re-armed.
    pub fn shutdown(&mut self) {
        self.state.shutdown();
    }
}
