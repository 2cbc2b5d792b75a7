//! Output devices.
//!
//! The engine does not own device enumeration or routing: it asks an
//! [`AudioOutput`] for its default format, hands it a [`Renderer`] to drive
//! and later asks it to stop.
//!
//! - [`PullOutput`] : host-driven device; whoever owns it calls `pull`
//! - `CpalOutput`   : system default device through CPAL (feature `realtime`)

use crate::error::{EngineError, Result};
use crate::render::Renderer;

/// Negotiated stream parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// An audio device the engine can attach its render callback to.
pub trait AudioOutput {
    /// Acquire the device and report its format.
    fn open(&mut self) -> Result<StreamFormat>;

    /// Start calling `renderer` from the device's audio context.
    fn start(&mut self, renderer: Renderer) -> Result<()>;

    /// Stop the stream and drop the renderer. Idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

// ----------------------------------- Pull device ---------------------------------

/// A device the host clocks itself, e.g. an audio unit callback on the other
/// side of the C ABI, or a test loop.
#[derive(Default)]
pub struct PullOutput {
    format: Option<StreamFormat>,
    renderer: Option<Renderer>,
    fail_open: bool,
    fail_start: bool,
}

impl PullOutput {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            format: Some(StreamFormat { sample_rate: sample_rate.max(1), channels: channels.max(1) }),
            ..Self::default()
        }
    }

    /// Make the next `open` fail as if the device were busy.
    #[must_use]
    pub fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make `start` fail as if the stream configuration were rejected.
    #[must_use]
    pub fn with_start_failure(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn set_failures(&mut self, open: bool, start: bool) {
        self.fail_open = open;
        self.fail_start = start;
    }

    pub fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    /// Render into an interleaved buffer. Writes silence when no session is
    /// attached; returns the frames produced by the engine.
    pub fn pull(&mut self, out: &mut [f32]) -> usize {
        match self.renderer.as_mut() {
            Some(r) => r.render(out),
            None => {
                out.fill(0.0);
                0
            }
        }
    }
}

impl AudioOutput for PullOutput {
    fn open(&mut self) -> Result<StreamFormat> {
        if self.fail_open {
            return Err(EngineError::Backend("device busy".into()));
        }
        self.format.ok_or(EngineError::NoDevice)
    }

    fn start(&mut self, renderer: Renderer) -> Result<()> {
        if self.fail_start {
            return Err(EngineError::Backend("stream configuration rejected".into()));
        }
        self.renderer = Some(renderer);
        Ok(())
    }

    fn stop(&mut self) {
        self.renderer = None;
    }

    fn is_active(&self) -> bool {
        self.renderer.is_some()
    }
}

// ----------------------------------- CPAL device ---------------------------------

#[cfg(feature = "realtime")]
pub use self::cpal_device::CpalOutput;

#[cfg(feature = "realtime")]
mod cpal_device {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use super::{AudioOutput, StreamFormat};
    use crate::error::{EngineError, Result};
    use crate::render::Renderer;

    fn backend(e: impl std::fmt::Display) -> EngineError {
        EngineError::Backend(e.to_string())
    }

    /// The host's default output device at its default configuration.
    #[derive(Default)]
    pub struct CpalOutput {
        device: Option<(cpal::Device, cpal::SupportedStreamConfig)>,
        stream: Option<cpal::Stream>,
    }

    impl CpalOutput {
        pub fn new() -> Self {
            Self::default()
        }
    }

    fn build_stream<T>(
        device: &cpal::Device,
        cfg: &cpal::StreamConfig,
        mut renderer: Renderer,
    ) -> Result<cpal::Stream>
    where
        T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
    {
        let err_fn = |e: cpal::StreamError| log::error!("output stream error: {e}");
        device
            .build_output_stream(
                cfg,
                move |output: &mut [T], _| {
                    renderer.render_with(output, |s| T::from_sample(s));
                },
                err_fn,
                None,
            )
            .map_err(backend)
    }

    impl AudioOutput for CpalOutput {
        fn open(&mut self) -> Result<StreamFormat> {
            let host = cpal::default_host();
            let device = host.default_output_device().ok_or(EngineError::NoDevice)?;
            let sup = device.default_output_config().map_err(backend)?;
            let format = StreamFormat { sample_rate: sup.sample_rate().0, channels: sup.channels() };
            if let Ok(name) = device.name() {
                log::debug!("output device: {name} ({format:?}, {:?})", sup.sample_format());
            }
            self.device = Some((device, sup));
            Ok(format)
        }

        fn start(&mut self, renderer: Renderer) -> Result<()> {
            let (device, sup) = self.device.as_ref().ok_or(EngineError::NoDevice)?;
            let cfg = sup.config();
            let stream = match sup.sample_format() {
                cpal::SampleFormat::F32 => build_stream::<f32>(device, &cfg, renderer)?,
                cpal::SampleFormat::I16 => build_stream::<i16>(device, &cfg, renderer)?,
                cpal::SampleFormat::U16 => build_stream::<u16>(device, &cfg, renderer)?,
                other => return Err(EngineError::Backend(format!("unsupported sample format: {other:?}"))),
            };
            stream.play().map_err(backend)?;
            self.stream = Some(stream);
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(stream) = self.stream.take() {
                if let Err(e) = stream.pause() {
                    log::debug!("pause before teardown failed: {e}");
                }
            }
            self.device = None;
        }

        fn is_active(&self) -> bool {
            self.stream.is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::EngineConfig;
    use crate::control::SharedControl;
    use crate::source::MixConfiguration;

    fn renderer(format: StreamFormat) -> Renderer {
        let shared = Arc::new(SharedControl::new(MixConfiguration::default(), 1.0));
        shared.request_fade(1.0, 0);
        Renderer::new(shared, format, &EngineConfig::default().with_seed(1))
    }

    #[test]
    fn pull_is_silent_until_started() {
        let mut out = PullOutput::new(48_000, 2);
        let mut buf = [0.5f32; 64];
        assert_eq!(out.pull(&mut buf), 0);
        assert!(buf.iter().all(|&s| s == 0.0));

        let format = out.open().unwrap();
        out.start(renderer(format)).unwrap();
        assert!(out.is_active());
        assert_eq!(out.pull(&mut buf), 32);
        assert!(buf.iter().any(|&s| s != 0.0));

        out.stop();
        assert!(!out.is_active());
        assert_eq!(out.pull(&mut buf), 0);
    }

    #[test]
    fn injected_failures_surface_as_backend_errors() {
        let mut out = PullOutput::new(44_100, 1).with_open_failure();
        assert!(matches!(out.open(), Err(EngineError::Backend(_))));

        let mut out = PullOutput::new(44_100, 1).with_start_failure();
        let format = out.open().unwrap();
        assert!(matches!(out.start(renderer(format)), Err(EngineError::Backend(_))));
        assert!(!out.is_active());
    }

    #[test]
    fn unconfigured_device_reports_no_device() {
        let mut out = PullOutput::default();
        assert!(matches!(out.open(), Err(EngineError::NoDevice)));
    }
}
