//! murmur engine: procedural ambient noise with glitch-free transport.
//!
//! Crate layout:
//! - [`source`]     : sound kinds, overlay sets, the packed mix configuration
//! - [`rng`]        : seedable xorshift RNG for the render thread
//! - [`nodes`]      : oscillator and random-walk building blocks
//! - [`generators`] : white, brown, fire, rain and bird generators + state bank
//! - [`mixer`]      : base + overlays, layer blending, loudness compensation
//! - [`control`]    : lock-free block shared by control and render contexts
//! - [`render`]     : the allocation-free render callback
//! - [`output`]     : output device seam (pull device, CPAL device)
//! - [`player`]     : looping player seam for file-backed overlays
//! - [`session`]    : one playback session and its lifecycle state
//! - [`transport`]  : play/stop/select/volume control surface
//! - [`config`]     : fade times, gains, seed and source policy
//!
//! Two execution contexts exist. The control context owns the [`Transport`]
//! and calls it from one thread. The render context owns a [`Renderer`] and
//! only ever exchanges atomics with the control side.

pub mod config;
pub mod control;
pub mod error;
pub mod generators;
pub mod mixer;
pub mod nodes;
pub mod output;
pub mod player;
pub mod render;
pub mod rng;
pub mod session;
pub mod source;
pub mod transport;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use output::{AudioOutput, PullOutput, StreamFormat};
pub use player::{AssetHandle, LoopPlayer, NoLoopPlayer};
pub use render::Renderer;
pub use session::{SessionState, SwitchPhase};
pub use source::{MixConfiguration, OverlaySet, SoundKind, SourcePolicy};
pub use transport::{Control, NowPlaying, Transport};

cfg_if::cfg_if! {
    if #[cfg(feature = "realtime")] {
        pub use output::CpalOutput;

        /// Transport on the system's default output device.
        pub fn default_transport(config: EngineConfig) -> Transport<CpalOutput> {
            Transport::new(CpalOutput::new(), config)
        }
    }
}
