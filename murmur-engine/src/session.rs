//! One active output instance and its lifecycle state.
//!
//! A session exists from `play` until its fade-out has been rendered and the
//! device torn down; "Idle" is simply the absence of a session. The session
//! never renders anything itself: it posts fade requests to the shared
//! control block and observes their completion.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::control::SharedControl;
use crate::output::StreamFormat;
use crate::player::AssetHandle;
use crate::source::{MixConfiguration, SoundKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwitchPhase {
    /// Fading out before the source set is reconfigured.
    FadingOut,
    /// Reconfigured, fading back in.
    FadingIn,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Playing,
    Switching(SwitchPhase),
    Stopping,
}

/// A loop player voice started for a file-backed overlay.
pub type LoopVoice = (SoundKind, AssetHandle);

pub struct PlaybackSession {
    shared: Arc<SharedControl>,
    format: StreamFormat,
    state: SessionState,
    pending_fade: Option<u16>,
    pending_mix: Option<MixConfiguration>,
    loops: Vec<LoopVoice>,
    staged: Vec<LoopVoice>,
    teardown_timeout: Duration,
    deadline: Option<Instant>,
}

impl PlaybackSession {
    /// A session in `Starting` with no fade requested yet.
    pub fn new(shared: Arc<SharedControl>, format: StreamFormat, teardown_timeout: Duration) -> Self {
        Self {
            shared,
            format,
            state: SessionState::Starting,
            pending_fade: None,
            pending_mix: None,
            loops: Vec::new(),
            staged: Vec::new(),
            teardown_timeout,
            deadline: None,
        }
    }

    #[inline] pub fn state(&self) -> SessionState { self.state }
    #[inline] pub fn shared(&self) -> &Arc<SharedControl> { &self.shared }
    #[inline] pub fn format(&self) -> StreamFormat { self.format }

    /// True during any fade or source swap.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.state != SessionState::Playing
    }

    /// Enter `state` and ramp the output gain to `target` over `ms`.
    ///
    /// Replaces any fade still in flight; the new one starts from whatever
    /// gain the renderer had reached.
    #[allow(clippy::cast_precision_loss)]
    pub fn begin(&mut self, state: SessionState, target: f32, ms: f32) {
        let frames = EngineConfig::fade_frames(ms, self.format.sample_rate as f32);
        self.pending_fade = Some(self.shared.request_fade(target, frames));
        self.state = state;
        self.deadline = Some(Instant::now() + self.teardown_timeout);
    }

    /// Enter `state` without touching the gain.
    pub fn enter(&mut self, state: SessionState) {
        self.state = state;
        if state == SessionState::Playing {
            self.deadline = None;
        }
    }

    /// True exactly once per fade, when the renderer reports it finished.
    pub fn take_completed(&mut self) -> bool {
        match self.pending_fade {
            Some(g) if self.shared.fade_done() == g => {
                self.pending_fade = None;
                true
            }
            _ => false,
        }
    }

    /// A fade the device never finished rendering, whatever the transition.
    pub fn fade_overdue(&self, now: Instant) -> bool {
        self.pending_fade.is_some() && self.deadline.is_some_and(|d| now >= d)
    }

    pub fn set_pending_mix(&mut self, mix: Option<MixConfiguration>) {
        self.pending_mix = mix;
    }

    pub fn take_pending_mix(&mut self) -> Option<MixConfiguration> {
        self.pending_mix.take()
    }

    /// Running loop voices.
    pub fn loops(&self) -> &[LoopVoice] {
        &self.loops
    }

    pub fn loops_mut(&mut self) -> &mut Vec<LoopVoice> {
        &mut self.loops
    }

    /// Voices loaded for a pending switch, not yet playing.
    pub fn staged_mut(&mut self) -> &mut Vec<LoopVoice> {
        &mut self.staged
    }
}
