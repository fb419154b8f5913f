//! Host window and frame-clock configuration.

/// Window and frame pacing configuration for the host binary
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Frame rate cap for both the window and headless loops (FPS)
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
        }
    }
}

impl WindowConfig {
    /// Duration of one frame at the target rate
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}
