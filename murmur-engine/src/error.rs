//! Engine error type.
//!
//! Only failures the host can act on are errors. Re-entrant control calls are
//! a debounce and come back as [`Control::Rejected`](crate::transport::Control),
//! and degenerate samples are a programming defect caught by `debug_assert!`.

use crate::source::SoundKind;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The platform has no output device to attach to.
    #[error("no audio output device available")]
    NoDevice,

    /// The device is busy or rejected the stream configuration.
    #[error("audio backend unavailable: {0}")]
    Backend(String),

    /// A file-backed ambient sound is not present in the bundle.
    #[error("ambient asset missing: {0}")]
    AssetMissing(&'static str),

    /// The kind cannot be used in the requested role (e.g. Fire as base noise).
    #[error("{0:?} cannot be selected here")]
    InvalidSelection(SoundKind),
}

pub type Result<T> = std::result::Result<T, EngineError>;
