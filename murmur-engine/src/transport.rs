//! Control surface: selection, play/stop, volume, and the session state
//! machine that sequences them.
//!
//! ```text
//!   Idle ──play──▶ Starting ──fade-in done──▶ Playing ──stop──▶ Stopping ──fade-out done──▶ Idle
//!                     │                        │   ▲                ▲
//!                     └──────────stop──────────┼───┼────────────────┘
//!                                              ▼   │
//!                                       Switching (out → reconfigure → in)
//! ```
//!
//! All methods run in the control context. Fades are rendered by the audio
//! thread; [`Transport::poll`] observes their completion and advances the
//! state machine, so the host calls it periodically (a UI tick is plenty).
//!
//! Selections that stay on the synthesized side are a single atomic store
//! and never interrupt audio. Selections that add or remove a file-backed
//! overlay fade out, swap loop voices and fade back in.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use murmur_core::dsp::clamp;

use crate::config::EngineConfig;
use crate::control::SharedControl;
use crate::error::Result;
use crate::output::AudioOutput;
use crate::player::{LoopPlayer, NoLoopPlayer};
use crate::render::Renderer;
use crate::session::{LoopVoice, PlaybackSession, SessionState, SwitchPhase};
use crate::source::{MixConfiguration, SoundKind};

/// Outcome of a control call that was not an error.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Accepted,
    /// Ignored because a transition is in progress.
    Rejected,
}

impl Control {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == Control::Accepted
    }
}

/// What an OS "now playing" surface shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub is_playing: bool,
}

pub struct Transport<O: AudioOutput, P: LoopPlayer = NoLoopPlayer> {
    output: O,
    player: P,
    config: EngineConfig,
    mix: MixConfiguration,
    volume: f32,
    session: Option<PlaybackSession>,
}

impl<O: AudioOutput> Transport<O> {
    /// Transport where every sound is synthesized.
    pub fn new(output: O, config: EngineConfig) -> Self {
        Self::with_player(output, NoLoopPlayer, config)
    }
}

impl<O: AudioOutput, P: LoopPlayer> Transport<O, P> {
    pub fn with_player(output: O, player: P, config: EngineConfig) -> Self {
        Self {
            output,
            player,
            config: config.sanitized(),
            mix: MixConfiguration::default(),
            volume: 1.0,
            session: None,
        }
    }

    // ------------------------------- selection ----------------------------------

    /// Replace the base noise (White or Brown).
    pub fn set_base_noise(&mut self, kind: SoundKind) -> Result<Control> {
        let next = self.mix.with_base(kind)?;
        self.reconfigure(next)
    }

    /// Add or remove an overlay (Fire, Rain or Birds).
    pub fn toggle_overlay(&mut self, kind: SoundKind) -> Result<Control> {
        let next = self.mix.toggled(kind)?;
        self.reconfigure(next)
    }

    /// Single-selection variant: a base kind plays alone, an overlay kind
    /// plays alone on top of the current base.
    pub fn select_sound(&mut self, kind: SoundKind) -> Result<Control> {
        let next = self.mix.single(kind);
        self.reconfigure(next)
    }

    fn reconfigure(&mut self, next: MixConfiguration) -> Result<Control> {
        if next == self.mix {
            return Ok(Control::Accepted);
        }
        let policy = self.config.policy;
        let Some(session) = self.session.as_mut() else {
            debug!("selected {} while idle", next.title());
            self.mix = next;
            return Ok(Control::Accepted);
        };

        let (from, to) = (policy.file_backed_part(self.mix), policy.file_backed_part(next));
        let cross_family = from != to;
        match session.state() {
            SessionState::Switching(_) => return Ok(Control::Rejected),
            SessionState::Playing if cross_family => {
                let mut staged = Vec::new();
                for kind in to.difference(from).iter() {
                    match self.player.load(kind.asset_name()) {
                        Ok(handle) => staged.push((kind, handle)),
                        Err(e) => {
                            warn!("{kind} unavailable: {e}");
                            release(&mut self.player, &mut staged);
                            return Err(e);
                        }
                    }
                }
                *session.staged_mut() = staged;
                session.set_pending_mix(Some(next));
                session.begin(
                    SessionState::Switching(SwitchPhase::FadingOut),
                    0.0,
                    self.config.switch_fade_ms,
                );
                debug!("switching to {}", next.title());
            }
            _ if cross_family => return Ok(Control::Rejected),
            _ => {
                session.shared().set_mix(policy.generated_part(next));
                debug!("now {}", next.title());
            }
        }
        self.mix = next;
        Ok(Control::Accepted)
    }

    // ------------------------------- transport ----------------------------------

    /// Open the device and fade in the current mix.
    ///
    /// Already playing: accepted, nothing happens. Any other live session is
    /// mid-transition and the call is rejected. A device failure leaves the
    /// transport idle.
    pub fn play(&mut self) -> Result<Control> {
        if let Some(session) = &self.session {
            return Ok(match session.state() {
                SessionState::Playing => Control::Accepted,
                _ => Control::Rejected,
            });
        }

        let format = self.output.open().inspect_err(|e| warn!("cannot open output: {e}"))?;

        let mut mix = self.mix;
        let mut voices: Vec<LoopVoice> = Vec::new();
        for kind in self.config.policy.file_backed_part(mix).iter() {
            match self.player.load(kind.asset_name()) {
                Ok(handle) => voices.push((kind, handle)),
                Err(e) => {
                    warn!("{kind} unavailable, playing without it: {e}");
                    mix = mix.with_overlays(mix.overlays().without(kind));
                }
            }
        }
        self.mix = mix;

        let shared = Arc::new(SharedControl::new(self.config.policy.generated_part(mix), self.volume));
        let renderer = Renderer::new(Arc::clone(&shared), format, &self.config);
        let timeout = Duration::from_millis(self.config.teardown_timeout_ms);
        let mut session = PlaybackSession::new(shared, format, timeout);
        session.begin(SessionState::Starting, 1.0, self.config.fade_in_ms);

        if let Err(e) = self.output.start(renderer) {
            warn!("output failed to start: {e}");
            self.output.stop();
            release(&mut self.player, &mut voices);
            return Err(e);
        }
        for &(_, handle) in &voices {
            self.player.set_volume(handle, 0.0);
            self.player.play(handle, true);
        }
        *session.loops_mut() = voices;

        info!("starting {} ({} Hz, {} ch)", mix.title(), format.sample_rate, format.channels);
        self.session = Some(session);
        Ok(Control::Accepted)
    }

    /// Fade out from the current gain and tear the device down once the
    /// fade has been rendered. Cancels a fade-in or a switch in progress.
    pub fn stop(&mut self) -> Control {
        let Some(session) = self.session.as_mut() else {
            return Control::Rejected;
        };
        if session.state() == SessionState::Stopping {
            return Control::Rejected;
        }
        release(&mut self.player, session.staged_mut());
        session.set_pending_mix(None);
        session.begin(SessionState::Stopping, 0.0, self.config.fade_out_ms);
        info!("stopping");
        Control::Accepted
    }

    /// Master volume in [0, 1], smoothed on the render thread.
    pub fn set_volume(&mut self, volume: f32) {
        let v = if volume.is_finite() { clamp(volume, 0.0, 1.0) } else { 0.0 };
        self.volume = v;
        if let Some(session) = &self.session {
            session.shared().set_volume(v);
            let gain = session.shared().gain();
            for &(_, handle) in session.loops() {
                self.player.set_volume(handle, gain * v);
            }
        }
    }

    /// Advance the state machine. Returns the state afterwards, `None` when
    /// idle.
    pub fn poll(&mut self) -> Option<SessionState> {
        let session = self.session.as_mut()?;
        let player = &mut self.player;

        let gain = session.shared().gain();
        for &(_, handle) in session.loops() {
            player.set_volume(handle, gain * self.volume);
        }

        if session.take_completed() {
            match session.state() {
                SessionState::Starting => {
                    session.enter(SessionState::Playing);
                    info!("playing {}", self.mix.title());
                }
                SessionState::Switching(SwitchPhase::FadingOut) => {
                    let next = session.take_pending_mix().unwrap_or(self.mix);
                    let policy = self.config.policy;
                    let keep = policy.file_backed_part(next);
                    session.loops_mut().retain(|&(kind, handle)| {
                        let kept = keep.contains(kind);
                        if !kept {
                            player.stop(handle);
                        }
                        kept
                    });
                    let staged: Vec<LoopVoice> = session.staged_mut().drain(..).collect();
                    for &(_, handle) in &staged {
                        player.set_volume(handle, 0.0);
                        player.play(handle, true);
                    }
                    session.loops_mut().extend(staged);
                    session.shared().set_mix(policy.generated_part(next));
                    session.begin(
                        SessionState::Switching(SwitchPhase::FadingIn),
                        1.0,
                        self.config.switch_fade_ms,
                    );
                }
                SessionState::Switching(SwitchPhase::FadingIn) => {
                    session.enter(SessionState::Playing);
                    debug!("switched to {}", self.mix.title());
                }
                SessionState::Stopping => {
                    self.teardown();
                    info!("stopped");
                }
                SessionState::Playing => {}
            }
        } else if session.fade_overdue(Instant::now()) {
            warn!(
                "{:?} fade not rendered within {} ms, forcing teardown",
                session.state(),
                self.config.teardown_timeout_ms
            );
            self.teardown();
        }
        self.state()
    }

    fn teardown(&mut self) {
        self.output.stop();
        if let Some(mut session) = self.session.take() {
            release(&mut self.player, session.loops_mut());
            release(&mut self.player, session.staged_mut());
        }
    }

    // ------------------------------- queries ------------------------------------

    pub fn state(&self) -> Option<SessionState> {
        self.session.as_ref().map(PlaybackSession::state)
    }

    /// True from `play` until `stop`.
    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.state() != SessionState::Stopping)
    }

    pub fn current_source_name(&self) -> String {
        self.mix.title()
    }

    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying { title: self.current_source_name(), is_playing: self.is_playing() }
    }

    /// Smoothed output RMS for a level meter; 0 while idle.
    pub fn output_level(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.shared().level())
    }

    #[inline] pub fn mix(&self) -> MixConfiguration { self.mix }
    #[inline] pub fn volume(&self) -> f32 { self.volume }
    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }
    #[inline] pub fn output(&self) -> &O { &self.output }
    #[inline] pub fn output_mut(&mut self) -> &mut O { &mut self.output }
    #[inline] pub fn player(&self) -> &P { &self.player }
}

/// Stop every voice in `voices` and forget it.
fn release<P: LoopPlayer>(player: &mut P, voices: &mut Vec<LoopVoice>) {
    for (_, handle) in voices.drain(..) {
        player.stop(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::output::PullOutput;
    use crate::player::AssetHandle;
    use crate::source::{OverlaySet, SourcePolicy};
    use murmur_core::dsp::block_rms;
    use murmur_core::filters::OnePoleLP;

    const SR: u32 = 48_000;
    const BLOCK: usize = 256;

    fn transport(config: EngineConfig) -> Transport<PullOutput> {
        Transport::new(PullOutput::new(SR, 2), config.with_seed(7))
    }

    /// Render `ms` of audio in device-sized blocks, polling after each one
    /// like a host UI tick would. Returns the left channel.
    fn pump<P: LoopPlayer>(t: &mut Transport<PullOutput, P>, ms: u32) -> Vec<f32> {
        let blocks = (SR as usize * ms as usize / 1000).div_ceil(BLOCK);
        let mut buf = [0.0f32; 2 * BLOCK];
        let mut left = Vec::with_capacity(blocks * BLOCK);
        for _ in 0..blocks {
            t.output_mut().pull(&mut buf);
            left.extend(buf.iter().step_by(2));
            let _ = t.poll();
        }
        left
    }

    #[derive(Default)]
    struct MockPlayer {
        next: u32,
        loaded: Vec<&'static str>,
        playing: Vec<AssetHandle>,
        released: Vec<AssetHandle>,
        volumes: Vec<(AssetHandle, f32)>,
    }

    impl LoopPlayer for MockPlayer {
        fn load(&mut self, asset: &'static str) -> Result<AssetHandle> {
            self.next += 1;
            self.loaded.push(asset);
            Ok(AssetHandle(self.next))
        }
        fn play(&mut self, handle: AssetHandle, looping: bool) {
            assert!(looping);
            self.playing.push(handle);
        }
        fn stop(&mut self, handle: AssetHandle) {
            self.playing.retain(|h| *h != handle);
            self.released.push(handle);
        }
        fn set_volume(&mut self, handle: AssetHandle, volume: f32) {
            self.volumes.push((handle, volume));
        }
    }

    #[test]
    fn white_noise_plays_at_steady_level() {
        let mut t = transport(EngineConfig::default());
        assert!(t.select_sound(SoundKind::White).unwrap().is_accepted());
        assert!(t.play().unwrap().is_accepted());
        assert!(t.is_playing());
        assert_eq!(t.state(), Some(SessionState::Starting));

        pump(&mut t, 300);
        assert_eq!(t.state(), Some(SessionState::Playing));

        let rms = block_rms(&pump(&mut t, 500));
        assert!((rms - 0.289 * 0.8).abs() < 0.02, "rms={rms}");
        assert!((t.output_level() - rms).abs() < 0.03, "meter {}", t.output_level());
    }

    #[test]
    fn fade_in_is_monotonic() {
        let mut t = transport(EngineConfig::default());
        let _ = t.play().unwrap();
        let mut buf = [0.0f32; 2 * BLOCK];
        let mut prev = 0.0;
        for _ in 0..60 {
            t.output_mut().pull(&mut buf);
            let gain = t.session.as_ref().map(|s| s.shared().gain()).unwrap();
            assert!(gain >= prev, "{gain} < {prev}");
            prev = gain;
            let _ = t.poll();
        }
        assert_eq!(prev, 1.0);
        assert_eq!(t.state(), Some(SessionState::Playing));
    }

    #[test]
    fn second_play_while_starting_is_rejected() {
        let mut t = transport(EngineConfig::default());
        assert_eq!(t.play().unwrap(), Control::Accepted);
        let first = t.session.as_ref().and_then(|s| s.shared().fade_request()).unwrap();
        assert_eq!(t.play().unwrap(), Control::Rejected);
        let still = t.session.as_ref().and_then(|s| s.shared().fade_request()).unwrap();
        assert_eq!(first, still);

        let mut became_playing = 0;
        let mut prev = t.state();
        let mut buf = [0.0f32; 2 * BLOCK];
        for _ in 0..100 {
            t.output_mut().pull(&mut buf);
            let now = t.poll();
            if prev == Some(SessionState::Starting) && now == Some(SessionState::Playing) {
                became_playing += 1;
            }
            prev = now;
        }
        assert_eq!(became_playing, 1);
        assert_eq!(t.play().unwrap(), Control::Accepted);
        assert_eq!(t.state(), Some(SessionState::Playing));
    }

    #[test]
    fn overlay_toggle_does_not_interrupt_playback() {
        let mut t = transport(EngineConfig::default());
        let _ = t.play().unwrap();
        pump(&mut t, 300);

        assert!(t.toggle_overlay(SoundKind::Fire).unwrap().is_accepted());
        assert_eq!(t.state(), Some(SessionState::Playing));
        assert!(t.mix().contains(SoundKind::Fire));
        assert!(t.output().is_active());

        let after = pump(&mut t, 200);
        for block in after.chunks(BLOCK) {
            let rms = block_rms(block);
            assert!(rms > 0.15, "dropout: block rms {rms}");
        }
        assert_eq!(t.current_source_name(), "White Noise + Fire");
    }

    /// RMS of what a slow one-pole lets through: the rumble band.
    fn low_band_rms(xs: &[f32]) -> f32 {
        let mut lp = OnePoleLP::with_alpha(0.005);
        let low: Vec<f32> = xs.iter().map(|&x| lp.process(x)).collect();
        block_rms(&low[1_000..])
    }

    #[test]
    fn toggled_fire_adds_its_rumble_to_the_output() {
        let mut plain = transport(EngineConfig::default());
        let mut fire = transport(EngineConfig::default());
        for t in [&mut plain, &mut fire] {
            let _ = t.play().unwrap();
            pump(t, 300);
        }
        assert!(fire.toggle_overlay(SoundKind::Fire).unwrap().is_accepted());
        pump(&mut plain, 100);
        pump(&mut fire, 100);

        let white = low_band_rms(&pump(&mut plain, 400));
        let with_fire = low_band_rms(&pump(&mut fire, 400));
        assert!(with_fire > white * 1.25, "white={white} with fire={with_fire}");
    }

    #[test]
    fn stop_during_fade_in_returns_to_idle() {
        let mut t = transport(EngineConfig::default());
        let _ = t.play().unwrap();
        pump(&mut t, 10);
        assert_eq!(t.state(), Some(SessionState::Starting));

        assert_eq!(t.stop(), Control::Accepted);
        assert!(!t.is_playing());
        assert_eq!(t.stop(), Control::Rejected);

        let tail = pump(&mut t, 500);
        assert_eq!(t.state(), None);
        assert!(!t.output().is_active());
        assert!(tail.iter().all(|s| s.abs() < 0.05), "fade-out started from the reached level");
        assert!(!t.now_playing().is_playing);
    }

    #[test]
    fn stop_while_idle_is_rejected() {
        let mut t = transport(EngineConfig::default());
        assert_eq!(t.stop(), Control::Rejected);
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn backend_failures_leave_the_transport_idle() {
        let mut t = Transport::new(PullOutput::new(SR, 2).with_open_failure(), EngineConfig::default());
        assert!(matches!(t.play(), Err(EngineError::Backend(_))));
        assert_eq!(t.state(), None);
        assert!(!t.is_playing());

        t.output_mut().set_failures(false, true);
        assert!(matches!(t.play(), Err(EngineError::Backend(_))));
        assert_eq!(t.state(), None);
        assert!(!t.output().is_active());

        t.output_mut().set_failures(false, false);
        assert_eq!(t.play().unwrap(), Control::Accepted);
        assert!(t.output().is_active());
    }

    #[test]
    fn watchdog_tears_down_a_stalled_device() {
        let mut t = transport(EngineConfig::default().with_teardown_timeout_ms(0));
        let _ = t.play().unwrap();
        let _ = t.stop();
        assert_eq!(t.poll(), None);
        assert!(!t.output().is_active());
    }

    #[test]
    fn watchdog_tears_down_a_device_that_never_pulls() {
        let mut t = transport(EngineConfig::default().with_teardown_timeout_ms(0));
        let _ = t.play().unwrap();
        assert_eq!(t.poll(), None);
        assert!(!t.output().is_active());
        assert_eq!(t.play().unwrap(), Control::Accepted);
    }

    #[test]
    fn invalid_roles_are_errors() {
        let mut t = transport(EngineConfig::default());
        assert!(matches!(t.set_base_noise(SoundKind::Fire), Err(EngineError::InvalidSelection(SoundKind::Fire))));
        assert!(matches!(t.toggle_overlay(SoundKind::Brown), Err(EngineError::InvalidSelection(SoundKind::Brown))));
        assert_eq!(t.mix(), MixConfiguration::default());
    }

    #[test]
    fn selections_while_idle_are_remembered() {
        let mut t = transport(EngineConfig::default());
        let _ = t.set_base_noise(SoundKind::Brown).unwrap();
        let _ = t.toggle_overlay(SoundKind::Birds).unwrap();
        assert_eq!(
            t.now_playing(),
            NowPlaying { title: "Brown Noise + Birds".into(), is_playing: false }
        );
        let _ = t.select_sound(SoundKind::Rain).unwrap();
        assert_eq!(t.current_source_name(), "Brown Noise + Rain");
        let _ = t.select_sound(SoundKind::White).unwrap();
        assert_eq!(t.current_source_name(), "White Noise");
    }

    #[test]
    fn volume_is_clamped() {
        let mut t = transport(EngineConfig::default());
        t.set_volume(2.0);
        assert_eq!(t.volume(), 1.0);
        t.set_volume(f32::NAN);
        assert_eq!(t.volume(), 0.0);
        t.set_volume(0.4);
        assert_eq!(t.volume(), 0.4);
    }

    fn file_backed_rain() -> EngineConfig {
        EngineConfig::default().with_policy(SourcePolicy::file_backed(OverlaySet::EMPTY.with(SoundKind::Rain)))
    }

    #[test]
    fn missing_asset_fails_the_toggle_only() {
        let mut t = transport(file_backed_rain());
        let _ = t.play().unwrap();
        pump(&mut t, 300);
        assert!(matches!(
            t.toggle_overlay(SoundKind::Rain),
            Err(EngineError::AssetMissing("rain_ambient"))
        ));
        assert_eq!(t.state(), Some(SessionState::Playing));
        assert!(!t.mix().contains(SoundKind::Rain));
        assert!(t.toggle_overlay(SoundKind::Fire).unwrap().is_accepted());
    }

    #[test]
    fn missing_asset_is_dropped_at_start() {
        let mut t = transport(file_backed_rain());
        let _ = t.toggle_overlay(SoundKind::Rain).unwrap();
        assert_eq!(t.play().unwrap(), Control::Accepted);
        assert!(!t.mix().contains(SoundKind::Rain));
    }

    #[test]
    fn file_backed_overlay_switches_across_families() {
        let mut t = Transport::with_player(PullOutput::new(SR, 2), MockPlayer::default(), file_backed_rain().with_seed(3));
        let _ = t.play().unwrap();
        pump(&mut t, 300);

        assert!(t.toggle_overlay(SoundKind::Rain).unwrap().is_accepted());
        assert_eq!(t.state(), Some(SessionState::Switching(SwitchPhase::FadingOut)));
        assert_eq!(t.player().loaded, vec!["rain_ambient"]);
        assert!(t.player().playing.is_empty());

        assert_eq!(t.toggle_overlay(SoundKind::Fire).unwrap(), Control::Rejected);
        assert_eq!(t.play().unwrap(), Control::Rejected);

        pump(&mut t, 400);
        assert_eq!(t.state(), Some(SessionState::Playing));
        assert_eq!(t.player().playing, vec![AssetHandle(1)]);
        let (_, v) = t.player().volumes.last().copied().unwrap();
        assert!((v - 1.0).abs() < 1e-3, "loop volume {v}");

        // Synthesized overlays still switch in place.
        assert!(t.toggle_overlay(SoundKind::Fire).unwrap().is_accepted());
        assert_eq!(t.state(), Some(SessionState::Playing));

        assert!(t.toggle_overlay(SoundKind::Rain).unwrap().is_accepted());
        pump(&mut t, 400);
        assert_eq!(t.state(), Some(SessionState::Playing));
        assert!(t.player().playing.is_empty());
    }

    #[test]
    fn stop_cancels_a_switch_and_stops_loops() {
        let mut t = Transport::with_player(PullOutput::new(SR, 2), MockPlayer::default(), file_backed_rain().with_seed(4));
        let _ = t.toggle_overlay(SoundKind::Rain).unwrap();
        let _ = t.play().unwrap();
        assert_eq!(t.player().playing, vec![AssetHandle(1)]);
        pump(&mut t, 300);

        let _ = t.toggle_overlay(SoundKind::Rain).unwrap();
        assert!(matches!(t.state(), Some(SessionState::Switching(_))));
        assert_eq!(t.stop(), Control::Accepted);
        pump(&mut t, 500);
        assert_eq!(t.state(), None);
        assert!(t.player().playing.is_empty());
    }

    #[test]
    fn loops_are_released_when_the_device_fails_to_start() {
        let output = PullOutput::new(SR, 2).with_start_failure();
        let mut t = Transport::with_player(output, MockPlayer::default(), file_backed_rain());
        let _ = t.toggle_overlay(SoundKind::Rain).unwrap();
        assert!(matches!(t.play(), Err(EngineError::Backend(_))));
        assert_eq!(t.player().loaded, vec!["rain_ambient"]);
        assert_eq!(t.player().released, vec![AssetHandle(1)]);
        assert!(t.player().playing.is_empty());
    }

    #[test]
    fn stop_releases_loops_staged_for_a_switch() {
        let mut t = Transport::with_player(PullOutput::new(SR, 2), MockPlayer::default(), file_backed_rain());
        let _ = t.play().unwrap();
        pump(&mut t, 300);

        assert!(t.toggle_overlay(SoundKind::Rain).unwrap().is_accepted());
        assert_eq!(t.player().loaded, vec!["rain_ambient"]);
        assert_eq!(t.stop(), Control::Accepted);
        assert_eq!(t.player().released, vec![AssetHandle(1)]);

        pump(&mut t, 500);
        assert_eq!(t.state(), None);
        assert!(t.player().playing.is_empty());
        assert_eq!(t.player().released, vec![AssetHandle(1)]);
    }
}
