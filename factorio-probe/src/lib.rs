//! # Factorio Probe
//!
//! Looks at the telemetry file the way the Mumble plugin does and says what
//! it sees. Useful when positional audio "just doesn't work".
//!
//! ## Usage
//!
//! ```bash
//! # One-shot report on the default telemetry file
//! factorio-probe
//!
//! # Machine-readable report for a specific file
//! factorio-probe --path ./player_position.txt --json
//!
//! # Pretend to be Mumble for ten probe/fetch cycles
//! factorio-probe --simulate 10 --interval 0.5 -v
//! ```
//!
//! ## Command-Line Options
//!
//! - `--path` - Read this telemetry file instead of the located one
//! - `--max-age` - Staleness threshold in seconds
//! - `--config` - Plugin config file to load instead of the default
//! - `--json` - Print the report as JSON
//! - `--simulate` - Run N probe/fetch cycles against the real provider
//! - `--running` - Process names to present to the provider while simulating

use clap::Parser;
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use factorio_core::{
    HostContext, HostLog, HostLogError, PositionRecord, ProbeOutcome, ProviderPhase,
    TelemetrySource,
};
use mumble_factorio::config::PluginConfig;
use mumble_factorio::provider::{PositionalProvider, ProviderSettings};
use mumble_factorio::telemetry_file::TelemetryFile;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Command line
// =============================================================================

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,

    /// Telemetry file to inspect (default: the one the plugin would use)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Staleness threshold in seconds; zero or negative means the default
    #[arg(short = 'a', long, allow_negative_numbers = true)]
    pub max_age: Option<i64>,

    /// Plugin config file (default: the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Run this many probe/fetch cycles like Mumble would
    #[arg(short, long)]
    pub simulate: Option<u32>,

    /// Seconds between simulated cycles
    #[arg(short, long, default_value_t = 1.0)]
    pub interval: f64,

    /// Running process names to report while simulating
    /// (default: the configured game executables)
    #[arg(short, long)]
    pub running: Vec<String>,
}

impl Cli {
    /// The plugin config with command-line overrides applied.
    pub fn plugin_config(&self) -> PluginConfig {
        let mut config = match &self.config {
            Some(path) => PluginConfig::load_from(path),
            None => PluginConfig::load(),
        };
        if let Some(path) = &self.path {
            config.telemetry_path = Some(path.clone());
        }
        if let Some(max_age) = self.max_age {
            config.max_age_secs = max_age;
        }
        config
    }

    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval).unwrap_or(Duration::ZERO)
    }
}

// =============================================================================
// One-shot report
// =============================================================================

/// What the plugin would see in the telemetry file right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub path: PathBuf,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<f64>,
    pub max_age_secs: u64,
    pub fresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PositionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HostContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    /// Inspect `file`. The record is decoded even when the file is stale, so
    /// the report shows what a paused game last wrote.
    pub fn inspect(file: &TelemetryFile, max_age: Duration) -> Self {
        let exists = file.exists();
        let (record, error) = if exists {
            match file.read_record() {
                Ok(record) => (Some(record), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            (None, Some(factorio_core::TelemetryError::FileAbsent.to_string()))
        };

        Report {
            path: file.path().to_path_buf(),
            exists,
            age_secs: file.age().map(|age| age.as_secs_f64()),
            max_age_secs: max_age.as_secs(),
            fresh: file.is_fresh(max_age),
            context: record.as_ref().map(HostContext::from),
            record,
            error,
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Telemetry file: {}", self.path.display())?;
        writeln!(f, "Exists:         {}", if self.exists { "yes" } else { "no" })?;
        match self.age_secs {
            Some(age) => writeln!(f, "Age:            {:.1}s", age)?,
            None => writeln!(f, "Age:            unknown")?,
        }
        writeln!(
            f,
            "Fresh:          {} (threshold {}s)",
            if self.fresh { "yes" } else { "no" },
            self.max_age_secs
        )?;
        if let Some(record) = &self.record {
            writeln!(
                f,
                "Position:       ({}, {}, {})",
                record.x, record.y, record.z
            )?;
        }
        if let Some(context) = &self.context {
            writeln!(f, "Context:        {}", context.context)?;
            writeln!(f, "Identity:       {}", context.identity)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error:          {}", error)?;
        }
        Ok(())
    }
}

// =============================================================================
// Simulated host
// =============================================================================

/// Stands in for Mumble's console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLog;

impl HostLog for ConsoleLog {
    fn log(&self, message: &str) -> Result<(), HostLogError> {
        println!("[mumble] {}", message);
        Ok(())
    }
}

/// One simulated host cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub index: u32,
    pub outcome: String,
    pub phase: ProviderPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:<3} {:<24} {:<24}", self.index, self.outcome, self.phase)?;
        if let (Some([x, y, z]), Some(context), Some(identity)) =
            (self.position, &self.context, &self.identity)
        {
            write!(f, " ({}, {}, {}) {} {}", x, y, z, context, identity)?;
        }
        Ok(())
    }
}

/// Drive `provider` like Mumble: probe, and fetch when the probe said ok.
pub fn run_cycle<S: TelemetrySource>(
    provider: &mut PositionalProvider<S>,
    index: u32,
    running: &[String],
    host: &dyn HostLog,
) -> Cycle {
    let outcome = provider.probe(running, host);
    let data = if outcome == ProbeOutcome::Ok {
        provider.fetch()
    } else {
        None
    };

    Cycle {
        index,
        outcome: outcome.to_string(),
        phase: provider.phase(),
        position: data.as_ref().map(|d| d.avatar_position),
        context: data.as_ref().map(|d| d.context.clone()),
        identity: data.map(|d| d.identity),
    }
}

/// Build the provider the plugin would build from `config`.
pub fn simulated_provider(config: &PluginConfig) -> PositionalProvider<TelemetryFile> {
    let provider = PositionalProvider::from_config(config);
    info!(
        "Simulating with executables {:?}, max age {:?}",
        provider.settings().game_executables,
        provider.settings().max_age
    );
    provider
}

/// Process names to present while simulating.
pub fn running_programs(cli: &Cli, settings: &ProviderSettings) -> Vec<String> {
    if cli.running.is_empty() {
        settings.game_executables.clone()
    } else {
        cli.running.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    const SCENARIO_A: &str = "XYZ header\nx:1.5\ny:-2.0\nz:0.25\np:3\nu:7\ns:hostplayer\n";

    #[derive(Default)]
    struct SilentLog;

    impl HostLog for SilentLog {
        fn log(&self, _message: &str) -> Result<(), HostLogError> {
            Ok(())
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("factorio-probe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = cli(&[]);
        assert_eq!(cli.path, None);
        assert!(!cli.json);
        assert_eq!(cli.simulate, None);
        assert_eq!(cli.interval(), Duration::from_secs(1));
        assert!(cli.running.is_empty());
    }

    #[test]
    fn test_cli_overrides_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.json");
        fs::write(&config_path, r#"{"maxAgeSecs": 9, "gameExecutables": ["f.exe"]}"#).unwrap();

        let cli = cli(&[
            "--config",
            config_path.to_str().unwrap(),
            "--path",
            "/tmp/pos.txt",
            "--max-age",
            "-3",
        ]);
        let config = cli.plugin_config();
        assert_eq!(config.telemetry_path, Some(PathBuf::from("/tmp/pos.txt")));
        assert_eq!(config.max_age(), Duration::from_secs(2));
        assert_eq!(config.game_executables, vec!["f.exe"]);
    }

    #[test]
    fn test_report_for_valid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("player_position.txt");
        fs::write(&path, SCENARIO_A).unwrap();

        let report = Report::inspect(&TelemetryFile::new(&path), Duration::from_secs(2));
        assert!(report.exists);
        assert!(report.fresh);
        assert_eq!(report.error, None);
        assert_eq!(report.record.as_ref().unwrap().player_id, 3);
        assert_eq!(report.context.as_ref().unwrap().context, "hostplayer/7");

        let text = report.to_string();
        assert!(text.contains("Identity:       3"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fresh"], true);
        assert_eq!(json["maxAgeSecs"], 2);
    }

    #[test]
    fn test_report_for_stale_and_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("player_position.txt");

        let missing = Report::inspect(&TelemetryFile::new(&path), Duration::from_secs(2));
        assert!(!missing.exists);
        assert!(!missing.fresh);
        assert_eq!(missing.age_secs, None);
        assert_eq!(missing.error.as_deref(), Some("Telemetry file not found"));

        fs::write(&path, SCENARIO_A).unwrap();
        fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(10))
            .unwrap();
        let stale = Report::inspect(&TelemetryFile::new(&path), Duration::from_secs(2));
        assert!(stale.exists);
        assert!(!stale.fresh);
        assert!(stale.record.is_some());
    }

    #[test]
    fn test_run_cycle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("player_position.txt");
        let config = PluginConfig {
            telemetry_path: Some(path.clone()),
            ..PluginConfig::default()
        };
        let mut provider = simulated_provider(&config);
        let running = vec!["factorio".to_string()];

        let cycle = run_cycle(&mut provider, 1, &running, &SilentLog);
        assert_eq!(cycle.outcome, ProbeOutcome::TemporarilyUnavailable.to_string());
        assert_eq!(cycle.phase, ProviderPhase::UnavailableTemporary);
        assert_eq!(cycle.position, None);

        fs::write(&path, SCENARIO_A).unwrap();
        let cycle = run_cycle(&mut provider, 2, &running, &SilentLog);
        assert_eq!(cycle.phase, ProviderPhase::Providing);
        assert_eq!(cycle.position, Some([1.5, -2.0, 0.25]));
        assert_eq!(cycle.identity.as_deref(), Some("3"));
        assert!(cycle.to_string().contains("hostplayer/7"));
    }

    #[test]
    fn test_running_programs() {
        let settings = ProviderSettings::default();
        assert_eq!(
            running_programs(&cli(&[]), &settings),
            settings.game_executables
        );
        assert_eq!(
            running_programs(&cli(&["-r", "notepad.exe"]), &settings),
            vec!["notepad.exe"]
        );
    }
}
