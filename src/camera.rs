//! Scroll-driven camera: a two-state machine plus per-frame easing.

use glam::Vec3;
use tracing::debug;

use crate::params::CameraConfig;

/// Which target the camera is heading for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraState {
    #[default]
    Far,
    Near,
}

/// Turns discrete wheel events into a continuous camera trajectory
///
/// Wheel events only flip the state; movement happens in [`Self::tick`],
/// once per rendered frame, however many events arrived in between.
pub struct CameraMotionController {
    config: CameraConfig,
    state: CameraState,
}

impl CameraMotionController {
    /// Create controller in the `Far` state
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            state: CameraState::Far,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Position the camera is placed at when the scene starts
    pub fn initial_position(&self) -> Vec3 {
        self.config.far_target
    }

    /// Scrolling forward (positive delta) zooms in; anything else zooms out
    pub fn on_wheel(&mut self, delta_y: f32) {
        let next = if delta_y > 0.0 {
            CameraState::Near
        } else {
            CameraState::Far
        };
        if next != self.state {
            debug!("Camera {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Target and per-frame rate for the current state
    pub fn target(&self) -> (Vec3, f32) {
        match self.state {
            CameraState::Far => (self.config.far_target, self.config.far_rate),
            CameraState::Near => (self.config.near_target, self.config.near_rate),
        }
    }

    /// Next camera position: `current` moved a fixed fraction toward the target
    pub fn tick(&self, current: Vec3) -> Vec3 {
        let (target, rate) = self.target();
        current + (target - current) * rate
    }
}
