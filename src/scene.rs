//! The visualizer scene: what the host's "ready" gesture starts.

use std::sync::Arc;

use tracing::info;

use crate::audio::{AudioAsset, AudioSession, AudioSink, Clock, OutputStatus, SystemClock};
use crate::camera::CameraMotionController;
use crate::error::Result;
use crate::frame::{FrameOutput, FrameUpdateLoop, SceneTarget};
use crate::params::AppConfig;

/// A running audio-reactive scene
pub struct Scene {
    session: AudioSession,
    camera: CameraMotionController,
    frame_loop: FrameUpdateLoop,
    output: OutputStatus,
}

impl Scene {
    /// Start playback and try to make it audible
    ///
    /// Call synchronously from a user-initiated event: platforms that gate
    /// audio output on a gesture only allow `connect` there. The asset is
    /// decoded beforehand, so nothing here waits on I/O.
    pub fn start(config: &AppConfig, sink: Box<dyn AudioSink>, asset: Arc<AudioAsset>) -> Result<Self> {
        Self::start_with_clock(config, sink, Box::new(SystemClock::new()), asset)
    }

    /// [`Self::start`] with an explicit playback clock
    pub fn start_with_clock(
        config: &AppConfig,
        sink: Box<dyn AudioSink>,
        clock: Box<dyn Clock>,
        asset: Arc<AudioAsset>,
    ) -> Result<Self> {
        config.validate()?;

        let mut session = AudioSession::with_clock(config.analyzer.clone(), sink, clock)?;
        session.open_asset(asset)?;
        let output = session.connect()?;

        let camera = CameraMotionController::new(config.camera.clone());
        let frame_loop = FrameUpdateLoop::new(config.visual.clone(), camera.initial_position());

        info!("Scene started ({:?})", output);

        Ok(Self {
            session,
            camera,
            frame_loop,
            output,
        })
    }

    pub fn output_status(&self) -> OutputStatus {
        self.output
    }

    pub fn session(&self) -> &AudioSession {
        &self.session
    }

    pub fn camera(&self) -> &CameraMotionController {
        &self.camera
    }

    /// Retry making the playback audible, e.g. on a later user gesture
    pub fn connect(&mut self) -> Result<OutputStatus> {
        self.output = self.session.connect()?;
        Ok(self.output)
    }

    pub fn on_wheel(&mut self, delta_y: f32) {
        self.camera.on_wheel(delta_y);
    }

    /// Advance one rendered frame
    pub fn frame(&mut self, target: &mut dyn SceneTarget) -> FrameOutput {
        self.frame_loop.frame(&mut self.session, &self.camera, target)
    }

    /// Tear down: disconnects output (idempotent, also done on drop)
    pub fn close(&mut self) {
        self.session.close();
    }
}
