//! Mumble Factorio Plugin
//!
//! Positional audio for Factorio. Mumble loads this library, asks it whether
//! Factorio is running with the telemetry mod, and then polls it for the
//! player's position every few frames.
//!
//! ```text
//!  Factorio mod ──writes──► script-output/player_position.txt
//!                                        │
//!                          TelemetryFile (telemetry_file.rs)
//!                                        │
//!  Mumble ──probe/fetch──► PositionalProvider (provider.rs)
//!         ◄──PDEC / vectors──            │
//!                                   factorio-core
//! ```
//!
//! The C exports below are the whole surface Mumble sees. They lock the
//! single plugin instance, delegate to [`provider::PositionalProvider`] and
//! translate the answer into the plugin API's types.

pub mod config;
pub mod locator;
pub mod mumble_ffi;
pub mod provider;
pub mod telemetry_file;

use log::{debug, error, info};
use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::{Mutex, MutexGuard, PoisonError};

use factorio_core::{PositionalData, ZERO_VECTOR};

use config::PluginConfig;
use mumble_ffi::{
    pdec, program_names, write_string, write_vector, ErrorCode, MumbleApi, MumbleHost,
    MumbleStringWrapper, MumbleVersion, PluginId, MUMBLE_FEATURE_POSITIONAL,
    MUMBLE_PLUGIN_API_VERSION, MUMBLE_STATUS_OK,
};
use provider::PositionalProvider;
use telemetry_file::TelemetryFile;

// =============================================================================
// Plugin Constants
// =============================================================================

const PLUGIN_NAME: &CStr = c"Factorio";
const PLUGIN_AUTHOR: &CStr = c"alifeee";
const PLUGIN_DESCRIPTION: &CStr =
    c"Factorio plugin for Mumble's Positional Audio API. Requires Factorio positional audio mod.";

const EMPTY: &CStr = c"";

// =============================================================================
// Plugin State
// =============================================================================

/// Context and identity handed to Mumble by the last successful fetch.
///
/// Mumble reads the pointers after `mumble_fetchPositionalData` returns, so
/// the strings stay here until the next fetch or shutdown.
struct HostStrings {
    context: CString,
    identity: CString,
}

impl TryFrom<&PositionalData> for HostStrings {
    type Error = std::ffi::NulError;

    fn try_from(data: &PositionalData) -> Result<Self, Self::Error> {
        Ok(Self {
            context: CString::new(data.context.as_str())?,
            identity: CString::new(data.identity.as_str())?,
        })
    }
}

struct Plugin {
    host: MumbleHost,
    provider: Option<PositionalProvider<TelemetryFile>>,
    strings: Option<HostStrings>,
}

impl Plugin {
    const fn new() -> Self {
        Self {
            host: MumbleHost::unregistered(),
            provider: None,
            strings: None,
        }
    }

    fn provider(&mut self) -> &mut PositionalProvider<TelemetryFile> {
        self.provider
            .get_or_insert_with(|| PositionalProvider::from_config(&PluginConfig::load()))
    }
}

// Mumble calls in from its own threads; every export goes through this lock.
static PLUGIN: Mutex<Plugin> = Mutex::new(Plugin::new());

fn plugin() -> MutexGuard<'static, Plugin> {
    PLUGIN.lock().unwrap_or_else(PoisonError::into_inner)
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}

// =============================================================================
// Lifecycle
// =============================================================================

#[no_mangle]
pub extern "C" fn mumble_init(plugin_id: PluginId) -> ErrorCode {
    init_logging();

    let mut plugin = plugin();
    plugin.host.set_plugin_id(plugin_id);
    plugin.provider = Some(PositionalProvider::from_config(&PluginConfig::load()));
    plugin.strings = None;

    info!("Factorio plugin initialised (id {})", plugin_id);
    MUMBLE_STATUS_OK
}

#[no_mangle]
pub extern "C" fn mumble_shutdown() {
    let mut plugin = plugin();
    plugin.provider = None;
    plugin.strings = None;
    info!("Factorio plugin shut down");
}

/// # Safety
/// `api_struct` must be null or point to a `MumbleAPI_v_1_0_x`.
#[no_mangle]
pub unsafe extern "C" fn mumble_registerAPIFunctions(api_struct: *mut c_void) {
    let mut plugin = plugin();
    plugin.host.register(api_struct as *const MumbleApi);
    debug!("Host API registered: {}", plugin.host.is_registered());
}

#[no_mangle]
pub extern "C" fn mumble_releaseResource(_pointer: *const c_void) {
    // Every string this plugin returns is static.
    error!("Mumble asked to release a resource this plugin never handed out");
}

// =============================================================================
// Metadata
// =============================================================================

#[no_mangle]
pub extern "C" fn mumble_getName() -> MumbleStringWrapper {
    MumbleStringWrapper::from_static(PLUGIN_NAME)
}

#[no_mangle]
pub extern "C" fn mumble_getAPIVersion() -> MumbleVersion {
    MUMBLE_PLUGIN_API_VERSION
}

#[no_mangle]
pub extern "C" fn mumble_getVersion() -> MumbleVersion {
    MumbleVersion::parse(env!("CARGO_PKG_VERSION"))
}

#[no_mangle]
pub extern "C" fn mumble_getAuthor() -> MumbleStringWrapper {
    MumbleStringWrapper::from_static(PLUGIN_AUTHOR)
}

#[no_mangle]
pub extern "C" fn mumble_getDescription() -> MumbleStringWrapper {
    MumbleStringWrapper::from_static(PLUGIN_DESCRIPTION)
}

#[no_mangle]
pub extern "C" fn mumble_getFeatures() -> u32 {
    MUMBLE_FEATURE_POSITIONAL
}

// =============================================================================
// Positional Audio
// =============================================================================

/// # Safety
/// `program_names_ptr` must be null or point to `program_count` C strings.
#[no_mangle]
pub unsafe extern "C" fn mumble_initPositionalData(
    program_names_ptr: *const *const c_char,
    _program_pids: *const u64,
    program_count: usize,
) -> u8 {
    let programs = program_names(program_names_ptr, program_count);

    let mut plugin = plugin();
    let host = plugin.host;
    let outcome = plugin.provider().probe(&programs, &host);
    pdec(outcome)
}

/// # Safety
/// Each vector pointer must be null or valid for three floats, and `context`
/// and `identity` must be null or valid for one pointer write.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn mumble_fetchPositionalData(
    avatar_pos: *mut f32,
    avatar_dir: *mut f32,
    avatar_axis: *mut f32,
    camera_pos: *mut f32,
    camera_dir: *mut f32,
    camera_axis: *mut f32,
    context: *mut *const c_char,
    identity: *mut *const c_char,
) -> bool {
    let mut plugin = plugin();
    let fetched = plugin.provider().fetch().and_then(|data| {
        HostStrings::try_from(&data)
            .map_err(|e| debug!("Unusable context or identity: {}", e))
            .ok()
            .map(|strings| (data, strings))
    });

    match fetched {
        Some((data, strings)) => {
            write_vector(avatar_pos, data.avatar_position);
            write_vector(avatar_dir, data.avatar_direction);
            write_vector(avatar_axis, data.avatar_axis);
            write_vector(camera_pos, data.camera_position);
            write_vector(camera_dir, data.camera_direction);
            write_vector(camera_axis, data.camera_axis);
            let strings = plugin.strings.insert(strings);
            write_string(context, strings.context.as_ptr());
            write_string(identity, strings.identity.as_ptr());
            true
        }
        None => {
            for out in [
                avatar_pos,
                avatar_dir,
                avatar_axis,
                camera_pos,
                camera_dir,
                camera_axis,
            ] {
                write_vector(out, ZERO_VECTOR);
            }
            write_string(context, EMPTY.as_ptr());
            write_string(identity, EMPTY.as_ptr());
            plugin.strings = None;
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn mumble_shutdownPositionalData() {
    let mut plugin = plugin();
    if let Some(provider) = plugin.provider.as_mut() {
        provider.shutdown();
    }
    plugin.strings = None;
    debug!("Positional data shut down");
}
