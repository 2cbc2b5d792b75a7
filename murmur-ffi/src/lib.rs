//! C ABI wrapper for the murmur engine.
//!
//! Exposes a small set of functions to create/destroy an engine, pull
//! interleaved f32 frames, and drive the transport.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `MurmurEngine` (heap-allocated; you own/delete it).
//! - Sound kinds are passed as `MURMUR_SOUND_*` indices.
//! - Control calls return a `MURMUR_*` status code (0 = accepted).
//!
//! Threading
//! - The object is NOT thread-safe. The host's audio callback and its UI
//!   must serialize their calls (e.g. render on the audio thread, control
//!   calls marshalled onto it, or a host-side lock around both).

use std::os::raw::c_char;
use std::ptr;

use murmur_engine::{
    Control, EngineConfig, EngineError, PullOutput, Result, SessionState, SoundKind, Transport,
};

pub const MURMUR_OK: i32 = 0;
pub const MURMUR_REJECTED: i32 = 1;
pub const MURMUR_ERR_NULL: i32 = -1;
pub const MURMUR_ERR_NO_DEVICE: i32 = -2;
pub const MURMUR_ERR_BACKEND: i32 = -3;
pub const MURMUR_ERR_ASSET_MISSING: i32 = -4;
pub const MURMUR_ERR_INVALID_SELECTION: i32 = -5;

pub const MURMUR_STATE_IDLE: i32 = 0;
pub const MURMUR_STATE_STARTING: i32 = 1;
pub const MURMUR_STATE_PLAYING: i32 = 2;
pub const MURMUR_STATE_SWITCHING: i32 = 3;
pub const MURMUR_STATE_STOPPING: i32 = 4;

/// Opaque engine wrapper we hand to C.
pub struct MurmurEngine {
    channels: u16,
    transport: Transport<PullOutput>,
}

impl MurmurEngine {
    fn new(sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let output = PullOutput::new(sample_rate.max(1), channels);
        Self { channels, transport: Transport::new(output, EngineConfig::default()) }
    }
}

fn status(result: Result<Control>) -> i32 {
    match result {
        Ok(Control::Accepted) => MURMUR_OK,
        Ok(Control::Rejected) => MURMUR_REJECTED,
        Err(e) => {
            log::warn!("murmur: {e}");
            match e {
                EngineError::NoDevice => MURMUR_ERR_NO_DEVICE,
                EngineError::Backend(_) => MURMUR_ERR_BACKEND,
                EngineError::AssetMissing(_) => MURMUR_ERR_ASSET_MISSING,
                EngineError::InvalidSelection(_) => MURMUR_ERR_INVALID_SELECTION,
            }
        }
    }
}

fn state_code(state: Option<SessionState>) -> i32 {
    match state {
        None => MURMUR_STATE_IDLE,
        Some(SessionState::Starting) => MURMUR_STATE_STARTING,
        Some(SessionState::Playing) => MURMUR_STATE_PLAYING,
        Some(SessionState::Switching(_)) => MURMUR_STATE_SWITCHING,
        Some(SessionState::Stopping) => MURMUR_STATE_STOPPING,
    }
}

/// Run `f` against the engine behind `engine`, or return `MURMUR_ERR_NULL`.
fn with_engine(engine: *mut MurmurEngine, f: impl FnOnce(&mut MurmurEngine) -> i32) -> i32 {
    if engine.is_null() {
        return MURMUR_ERR_NULL;
    }
    let e = unsafe { &mut *engine };
    f(e)
}

fn with_kind(engine: *mut MurmurEngine, kind: u32, f: impl FnOnce(&mut MurmurEngine, SoundKind) -> i32) -> i32 {
    with_engine(engine, |e| match SoundKind::from_index(kind as usize) {
        Some(k) => f(e, k),
        None => MURMUR_ERR_INVALID_SELECTION,
    })
}

// --- Creation / destruction -------------------------------------------------------

/// Create an engine that renders at `sample_rate` into `channels` interleaved
/// channels. Starts idle with White noise selected.
#[no_mangle]
pub extern "C" fn murmur_create(sample_rate: u32, channels: u16) -> *mut MurmurEngine {
    Box::into_raw(Box::new(MurmurEngine::new(sample_rate, channels)))
}

/// Destroy an engine previously returned by `murmur_create`.
#[no_mangle]
pub extern "C" fn murmur_destroy(engine: *mut MurmurEngine) {
    if !engine.is_null() {
        unsafe { drop(Box::from_raw(engine)); }
    }
}

// --- Rendering -------------------------------------------------------------------

/// Render `frames` of audio into an interleaved f32 buffer. `channels` must
/// match the count given to `murmur_create`. Writes silence while idle.
///
/// Returns the number of frames produced by the engine (0 while idle or on
/// error).
#[no_mangle]
pub extern "C" fn murmur_render_interleaved_f32(
    engine: *mut MurmurEngine,
    out_interleaved: *mut f32,
    frames: u32,
    channels: u32,
) -> u32 {
    if engine.is_null() || out_interleaved.is_null() || frames == 0 {
        return 0;
    }
    let e = unsafe { &mut *engine };
    if channels != u32::from(e.channels) {
        return 0;
    }
    let len = frames as usize * channels as usize;
    let out = unsafe { std::slice::from_raw_parts_mut(out_interleaved, len) };
    u32::try_from(e.transport.output_mut().pull(out)).unwrap_or(u32::MAX)
}

// --- Transport -------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn murmur_play(engine: *mut MurmurEngine) -> i32 {
    with_engine(engine, |e| status(e.transport.play()))
}

#[no_mangle]
pub extern "C" fn murmur_stop(engine: *mut MurmurEngine) -> i32 {
    with_engine(engine, |e| status(Ok(e.transport.stop())))
}

/// `kind` must be `MURMUR_SOUND_WHITE` or `MURMUR_SOUND_BROWN`.
#[no_mangle]
pub extern "C" fn murmur_set_base_noise(engine: *mut MurmurEngine, kind: u32) -> i32 {
    with_kind(engine, kind, |e, k| status(e.transport.set_base_noise(k)))
}

/// `kind` must be `MURMUR_SOUND_FIRE`, `MURMUR_SOUND_RAIN` or `MURMUR_SOUND_BIRDS`.
#[no_mangle]
pub extern "C" fn murmur_toggle_overlay(engine: *mut MurmurEngine, kind: u32) -> i32 {
    with_kind(engine, kind, |e, k| status(e.transport.toggle_overlay(k)))
}

#[no_mangle]
pub extern "C" fn murmur_select_sound(engine: *mut MurmurEngine, kind: u32) -> i32 {
    with_kind(engine, kind, |e, k| status(e.transport.select_sound(k)))
}

/// Master volume, clamped to [0, 1]. Non-finite values mute.
#[no_mangle]
pub extern "C" fn murmur_set_volume(engine: *mut MurmurEngine, volume: f32) {
    if engine.is_null() { return; }
    let e = unsafe { &mut *engine };
    e.transport.set_volume(volume);
}

/// Advance fades and lifecycle; call periodically (e.g. from a UI tick).
/// Returns a `MURMUR_STATE_*` code.
#[no_mangle]
pub extern "C" fn murmur_poll(engine: *mut MurmurEngine) -> i32 {
    with_engine(engine, |e| state_code(e.transport.poll()))
}

#[no_mangle]
pub extern "C" fn murmur_is_playing(engine: *const MurmurEngine) -> bool {
    if engine.is_null() { return false; }
    let e = unsafe { &*engine };
    e.transport.is_playing()
}

/// Copy the current source name ("White Noise + Fire") into `buf` as a
/// NUL-terminated string, truncating to fit. Returns the full name length
/// in bytes, excluding the terminator.
#[no_mangle]
pub extern "C" fn murmur_current_source_name(engine: *const MurmurEngine, buf: *mut c_char, len: usize) -> usize {
    if engine.is_null() { return 0; }
    let e = unsafe { &*engine };
    let name = e.transport.current_source_name();
    if !buf.is_null() && len > 0 {
        let n = name.len().min(len - 1);
        unsafe {
            ptr::copy_nonoverlapping(name.as_ptr().cast::<c_char>(), buf, n);
            *buf.add(n) = 0;
        }
    }
    name.len()
}
