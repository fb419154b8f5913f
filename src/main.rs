//! Vibesphere - a sphere that breathes with the bass line
//!
//! Loads one track, waits for a click (browsers and some desktops only
//! allow sound after a user gesture), then loops it while the sphere
//! pulses. Scroll to zoom the camera in and out.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use clap::Parser;
use glam::Vec3;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use vibesphere::audio::{decode, AudioAsset};
use vibesphere::cli::Args;
use vibesphere::frame::{FramePacer, SceneTarget};
use vibesphere::params::WindowConfig;
use vibesphere::scene::Scene;
use vibesphere::Result;

/// Scene target that reports what a renderer would draw
#[derive(Default)]
struct LogTarget {
    scale: f32,
    distort: f32,
    camera: Vec3,
    frames: u64,
}

impl LogTarget {
    fn end_frame(&mut self) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            info!(
                "scale={:.3} distort={:.3} camera=({:.2}, {:.2}, {:.2})",
                self.scale, self.distort, self.camera.x, self.camera.y, self.camera.z
            );
        }
    }
}

impl SceneTarget for LogTarget {
    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn set_distort(&mut self, distort: f32) {
        self.distort = distort;
    }

    fn set_camera_position(&mut self, position: Vec3) {
        self.camera = position;
    }
}

/// Fetch and decode the track off the main thread
fn spawn_loader(path: PathBuf) -> JoinHandle<Result<AudioAsset>> {
    thread::spawn(move || load_asset(&path))
}

fn load_asset(path: &Path) -> Result<AudioAsset> {
    let started = Instant::now();
    let bytes = std::fs::read(path)?;
    let asset = decode(&bytes)?;
    info!(
        "Loaded {} ({:.1}s) in {:?}",
        path.display(),
        asset.duration().as_secs_f32(),
        started.elapsed()
    );
    Ok(asset)
}

/// Main application state
struct App {
    args: Args,
    window_config: WindowConfig,
    window: Option<Arc<Window>>,

    loader: Option<JoinHandle<Result<AudioAsset>>>,
    asset: Option<Arc<AudioAsset>>,

    scene: Option<Scene>,
    target: LogTarget,
    pacer: FramePacer,
    frame_pending: bool,
    failed: bool,
}

impl App {
    fn new(args: Args) -> Self {
        let loader = Some(spawn_loader(args.audio.clone()));
        let window_config = WindowConfig::default();
        let pacer = FramePacer::new(window_config.frame_interval());
        Self {
            args,
            window_config,
            window: None,
            loader,
            asset: None,
            scene: None,
            target: LogTarget::default(),
            pacer,
            frame_pending: false,
            failed: false,
        }
    }

    /// Pick up the decoded asset once the loader thread is done
    fn poll_loader(&mut self, event_loop: &ActiveEventLoop) {
        if !self.loader.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.loader.take() else {
            return;
        };

        match handle.join() {
            Ok(Ok(asset)) => {
                self.asset = Some(Arc::new(asset));
                self.set_title("Vibesphere - click or press Enter to start");
            }
            Ok(Err(e)) => self.fail(event_loop, &format!("Failed to load audio: {}", e)),
            Err(_) => self.fail(event_loop, "Audio loader thread panicked"),
        }
    }

    /// The "ready" gesture: start the scene from inside the input event
    fn start(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.as_mut() {
            // Later gestures retry a refused output
            if let Err(e) = scene.connect() {
                debug!("Reconnect skipped: {}", e);
            }
            return;
        }
        let Some(asset) = self.asset.clone() else {
            info!("Still loading audio...");
            return;
        };

        match Scene::start(&self.args.app_config(), self.args.sink(), asset) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.set_title("Vibesphere - scroll to zoom, ESC to quit");
            }
            Err(e) => self.fail(event_loop, &format!("Failed to start scene: {}", e)),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, message: &str) {
        error!("{}", message);
        self.failed = true;
        event_loop.exit();
    }

    fn set_title(&self, title: &str) {
        if let Some(window) = &self.window {
            window.set_title(title);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.as_mut() {
            scene.close();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_loader(event_loop);
        let Some(window) = &self.window else {
            return;
        };

        if self.pacer.try_begin(Instant::now()) {
            self.frame_pending = true;
            window.request_redraw();
        }
        if let Some(deadline) = self.pacer.deadline() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Vibesphere - loading...")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.window_width,
                self.window_config.window_height,
            ));

        match event_loop.create_window(window_attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.fail(event_loop, &format!("Failed to create window: {}", e)),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => self.shutdown(event_loop),
                KeyCode::Enter | KeyCode::Space => self.start(event_loop),
                _ => {}
            },
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => self.start(event_loop),
            WindowEvent::MouseWheel { delta, .. } => {
                // Wheel "down" (toward the user) is positive, as on the web
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
                };
                if let Some(scene) = self.scene.as_mut() {
                    scene.on_wheel(delta_y);
                }
            }
            // Resizes and exposes also request redraws; only paced ones advance the scene
            WindowEvent::RedrawRequested if self.frame_pending => {
                self.frame_pending = false;
                if let Some(scene) = self.scene.as_mut() {
                    scene.frame(&mut self.target);
                    self.target.end_frame();
                }
            }
            _ => {}
        }
    }
}

/// Run a fixed number of frames without a window
fn run_headless(args: &Args) -> Result<()> {
    let asset = match spawn_loader(args.audio.clone()).join() {
        Ok(result) => Arc::new(result?),
        Err(_) => {
            return Err(vibesphere::AudioError::Decode(
                "Audio loader thread panicked".to_string(),
            ))
        }
    };

    let window_config = WindowConfig::default();
    let mut scene = Scene::start(&args.app_config(), args.sink(), asset)?;
    let mut target = LogTarget::default();
    let mut pacer = FramePacer::new(window_config.frame_interval());

    let mut frames = 0;
    while frames < args.frames {
        let now = Instant::now();
        if !pacer.try_begin(now) {
            if let Some(rest) = pacer.deadline().and_then(|d| d.checked_duration_since(now)) {
                thread::sleep(rest);
            }
            continue;
        }
        scene.frame(&mut target);
        target.end_frame();
        frames += 1;
    }

    scene.close();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Vibesphere - audio-reactive sphere");

    if args.headless {
        return match run_headless(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(args);
    if let Err(e) = event_loop.run_app(&mut app) {
        warn!("Event loop ended with error: {}", e);
    }

    if app.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
