//! Mumble plugin API bindings (v1.0.x)
//!
//! The C types Mumble exchanges with a plugin, and safe wrappers around the
//! host functions this plugin calls.
//!
//! Based on `MumblePlugin_v_1_0_x.h` from the Mumble plugin API.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use factorio_core::{HostLog, HostLogError, ProbeOutcome};

// =============================================================================
// Scalar types and constants
// =============================================================================

/// `mumble_error_t`
pub type ErrorCode = i32;
/// `mumble_plugin_id_t`
pub type PluginId = u32;

pub const MUMBLE_STATUS_OK: ErrorCode = 0;
pub const MUMBLE_EC_GENERIC_ERROR: ErrorCode = -1;

pub const MUMBLE_FEATURE_POSITIONAL: u32 = 1 << 0;

// Positional data error codes returned by mumble_initPositionalData
pub const MUMBLE_PDEC_OK: u8 = 0;
pub const MUMBLE_PDEC_ERROR_TEMP: u8 = 1;
pub const MUMBLE_PDEC_ERROR_PERM: u8 = 2;

/// Host signal for a probe answer.
pub fn pdec(outcome: ProbeOutcome) -> u8 {
    match outcome {
        ProbeOutcome::Ok => MUMBLE_PDEC_OK,
        ProbeOutcome::TemporarilyUnavailable => MUMBLE_PDEC_ERROR_TEMP,
        ProbeOutcome::PermanentlyUnavailable => MUMBLE_PDEC_ERROR_PERM,
    }
}

// =============================================================================
// Structs
// =============================================================================

/// `mumble_version_t`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MumbleVersion {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
}

/// The plugin API version the bindings in this module match.
pub const MUMBLE_PLUGIN_API_VERSION: MumbleVersion = MumbleVersion {
    major: 1,
    minor: 0,
    patch: 2,
};

impl MumbleVersion {
    /// Parse a `major.minor.patch` string; missing or bad parts become 0.
    pub fn parse(version: &str) -> Self {
        let mut parts = version
            .split('.')
            .map(|part| part.trim().parse::<i32>().unwrap_or(0));
        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }
}

/// `struct MumbleStringWrapper`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MumbleStringWrapper {
    pub data: *const c_char,
    pub size: usize,
    pub needs_releasing: bool,
}

impl MumbleStringWrapper {
    /// Wrap a string that lives for the whole program. Mumble must not hand
    /// it back to `mumble_releaseResource`.
    pub fn from_static(s: &'static CStr) -> Self {
        Self {
            data: s.as_ptr(),
            size: s.to_bytes().len(),
            needs_releasing: false,
        }
    }
}

type LogFn = unsafe extern "C" fn(caller_id: PluginId, message: *const c_char) -> ErrorCode;
type UnusedFn = Option<unsafe extern "C" fn()>;

/// Leading part of `struct MumbleAPI_v_1_0_x`, up to and including `log`.
///
/// Every member of the host struct is a function pointer. The 36 entries
/// before `log` (`freeMemory` through `sendData`) are never called by this
/// plugin and only keep the layout. Members after `log` are not copied.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MumbleApi {
    _unused: [UnusedFn; 36],
    pub log: Option<LogFn>,
}

// =============================================================================
// Host handle
// =============================================================================

/// The host API plus the id Mumble assigned to this plugin.
#[derive(Clone, Copy)]
pub struct MumbleHost {
    api: Option<MumbleApi>,
    plugin_id: PluginId,
}

impl MumbleHost {
    /// A host that has not registered its API yet.
    pub const fn unregistered() -> Self {
        Self {
            api: None,
            plugin_id: 0,
        }
    }

    /// Copy the API struct Mumble passes to `mumble_registerAPIFunctions`.
    ///
    /// # Safety
    /// `api_struct` must be null or point to a `MumbleAPI_v_1_0_x`.
    pub unsafe fn register(&mut self, api_struct: *const MumbleApi) {
        self.api = if api_struct.is_null() {
            None
        } else {
            Some(ptr::read(api_struct))
        };
    }

    pub fn set_plugin_id(&mut self, plugin_id: PluginId) {
        self.plugin_id = plugin_id;
    }

    pub fn is_registered(&self) -> bool {
        self.api.and_then(|api| api.log).is_some()
    }
}

impl HostLog for MumbleHost {
    fn log(&self, message: &str) -> Result<(), HostLogError> {
        let log_fn = self
            .api
            .and_then(|api| api.log)
            .ok_or_else(HostLogError::not_registered)?;
        let message = CString::new(message)
            .map_err(|e| HostLogError::new(MUMBLE_EC_GENERIC_ERROR, e.to_string()))?;
        let status = unsafe { log_fn(self.plugin_id, message.as_ptr()) };
        if status == MUMBLE_STATUS_OK {
            Ok(())
        } else {
            Err(HostLogError::from_code(status))
        }
    }
}

// =============================================================================
// Argument helpers
// =============================================================================

/// Copy Mumble's list of running program names.
///
/// Null entries are skipped; names that are not UTF-8 are converted lossily.
///
/// # Safety
/// `names` must be null or point to `count` pointers, each null or pointing
/// to a NUL-terminated string.
pub unsafe fn program_names(names: *const *const c_char, count: usize) -> Vec<String> {
    if names.is_null() {
        return Vec::new();
    }
    std::slice::from_raw_parts(names, count)
        .iter()
        .filter(|name| !name.is_null())
        .map(|name| CStr::from_ptr(*name).to_string_lossy().into_owned())
        .collect()
}

/// Write a vector to one of the host's `float[3]` out-parameters.
///
/// # Safety
/// `out` must be null or valid for writing three floats.
pub unsafe fn write_vector(out: *mut f32, value: [f32; 3]) {
    if !out.is_null() {
        ptr::copy_nonoverlapping(value.as_ptr(), out, value.len());
    }
}

/// Write a string pointer to one of the host's `const char**` out-parameters.
///
/// # Safety
/// `out` must be null or valid for writing one pointer.
pub unsafe fn write_string(out: *mut *const c_char, value: *const c_char) {
    if !out.is_null() {
        *out = value;
    }
}

// =============================================================================
// Tests
// =============================================================================
