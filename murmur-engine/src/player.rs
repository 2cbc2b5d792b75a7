//! Looping player for pre-rendered ambient loops.
//!
//! Overlays marked file-backed in the [`SourcePolicy`](crate::source::SourcePolicy)
//! are not synthesized; the transport plays the bundled loop through a
//! [`LoopPlayer`] the platform provides instead.

use crate::error::{EngineError, Result};

/// Opaque handle to a loaded asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub u32);

pub trait LoopPlayer {
    /// Load a bundled asset by name, e.g. `"fire_ambient"`.
    fn load(&mut self, asset: &'static str) -> Result<AssetHandle>;

    fn play(&mut self, handle: AssetHandle, looping: bool);

    /// Stop and release `handle`, whether or not it was ever played.
    fn stop(&mut self, handle: AssetHandle);

    /// Linear volume in [0, 1].
    fn set_volume(&mut self, handle: AssetHandle, volume: f32);
}

/// Player for builds without bundled assets: nothing can be loaded.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoLoopPlayer;

impl LoopPlayer for NoLoopPlayer {
    fn load(&mut self, asset: &'static str) -> Result<AssetHandle> {
        Err(EngineError::AssetMissing(asset))
    }

    fn play(&mut self, _handle: AssetHandle, _looping: bool) {}

    fn stop(&mut self, _handle: AssetHandle) {}

    fn set_volume(&mut self, _handle: AssetHandle, _volume: f32) {}
}
