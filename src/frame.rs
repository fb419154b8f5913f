//! Per-frame update: audio first, then camera, then push to the scene.

use std::time::{Duration, Instant};

use glam::Vec3;
use tracing::{debug, trace, warn};

use crate::audio::{AudioSession, SessionState};
use crate::error::AudioError;
use crate::camera::CameraMotionController;
use crate::params::VisualMapping;

/// Rendering collaborator: the only view this crate has of the 3D scene
pub trait SceneTarget {
    /// Uniform scale of the audio-reactive mesh
    fn set_scale(&mut self, scale: f32);

    /// Distortion factor of the mesh (0.0..=1.0)
    fn set_distort(&mut self, distort: f32);

    fn set_camera_position(&mut self, position: Vec3);
}

/// Values applied to the scene in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Metric after caller-side smoothing
    pub metric: f32,
    /// Whether the session produced a new metric this frame
    pub fresh: bool,
    pub scale: f32,
    pub distort: f32,
    pub camera_position: Vec3,
}

/// Drives one frame of audio and camera updates
///
/// Holds the state that must persist between frames: the smoothed metric
/// and the live camera position.
pub struct FrameUpdateLoop {
    mapping: VisualMapping,
    smoothed_metric: f32,
    camera_position: Vec3,
    frames: u64,
}

impl FrameUpdateLoop {
    /// Camera starts exactly at `initial_camera`; it is never teleported afterwards
    pub fn new(mapping: VisualMapping, initial_camera: Vec3) -> Self {
        Self {
            mapping,
            smoothed_metric: 0.0,
            camera_position: initial_camera,
            frames: 0,
        }
    }

    pub fn smoothed_metric(&self) -> f32 {
        self.smoothed_metric
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame and apply the result to `target`
    ///
    /// If the session cannot produce a metric this frame (closed, not yet
    /// open) the previous metric is kept.
    pub fn frame(
        &mut self,
        session: &mut AudioSession,
        camera: &CameraMotionController,
        target: &mut dyn SceneTarget,
    ) -> FrameOutput {
        let (latest, fresh) = match session.tick() {
            Ok(metric) => (metric, true),
            Err(err @ AudioError::InvalidState { .. })
                if session.state() == SessionState::Unopened =>
            {
                warn!("Frame before the audio session was opened: {}", err);
                (self.smoothed_metric, false)
            }
            Err(err) => {
                debug!("Keeping last metric: {}", err);
                (self.smoothed_metric, false)
            }
        };
        self.smoothed_metric += (latest - self.smoothed_metric) * self.mapping.metric_response;

        self.camera_position = camera.tick(self.camera_position);

        let output = FrameOutput {
            metric: self.smoothed_metric,
            fresh,
            scale: self.mapping.scale_for(self.smoothed_metric),
            distort: self.mapping.distort_for(self.smoothed_metric),
            camera_position: self.camera_position,
        };

        target.set_scale(output.scale);
        target.set_distort(output.distort);
        target.set_camera_position(output.camera_position);

        self.frames += 1;
        trace!(
            "frame {}: metric={:.1} scale={:.3} distort={:.3} camera={:?}",
            self.frames,
            output.metric,
            output.scale,
            output.distort,
            output.camera_position
        );

        output
    }
}

/// Paces frames to a fixed rate
///
/// Camera and metric easing are per-frame fractions, so the frame rate
/// must be bounded for motion to stay smooth.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next_frame: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_frame: None,
        }
    }

    /// When the next frame is due (`None` before the first frame)
    pub fn deadline(&self) -> Option<Instant> {
        self.next_frame
    }

    /// Start a frame if one is due at `now`
    ///
    /// A pacer that fell more than one interval behind restarts from `now`
    /// instead of bursting to catch up.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        match self.next_frame {
            Some(deadline) if now < deadline => false,
            Some(deadline) if now < deadline + self.interval => {
                self.next_frame = Some(deadline + self.interval);
                true
            }
            _ => {
                self.next_frame = Some(now + self.interval);
                true
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Scene target that remembers the last values it was given
    #[derive(Debug, Default)]
    pub struct RecordingTarget {
        pub scale: Option<f32>,
        pub distort: Option<f32>,
        pub camera: Option<Vec3>,
        pub calls: usize,
    }

    impl SceneTarget for RecordingTarget {
        fn set_scale(&mut self, scale: f32) {
            self.scale = Some(scale);
            self.calls += 1;
        }

        fn set_distort(&mut self, distort: f32) {
            self.distort = Some(distort);
            self.calls += 1;
        }

        fn set_camera_position(&mut self, position: Vec3) {
            self.camera = Some(position);
            self.calls += 1;
        }
    }
}
