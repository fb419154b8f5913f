//! End-to-end lifecycle of a scene through the public API.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use vibesphere::audio::{
    decode, reduce, AudioSession, AudioSink, ManualClock, NullSink, OutputStatus, PlaybackFeed,
    SessionState,
};
use vibesphere::camera::CameraState;
use vibesphere::frame::SceneTarget;
use vibesphere::params::{AnalyzerConfig, AppConfig};
use vibesphere::scene::Scene;
use vibesphere::{AudioError, Result};

/// Square-ish bass pulse: 0.25s on, 0.25s off
fn pulse_wav(sample_rate: u32, secs: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(secs * sample_rate as f32) as usize {
            let t = i as f32 / sample_rate as f32;
            let gate = if (t * 2.0).fract() < 0.5 { 0.8 } else { 0.0 };
            let value = (2.0 * std::f32::consts::PI * 70.0 * t).sin() * gate;
            writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

struct PermissionDenied;

impl AudioSink for PermissionDenied {
    fn connect(&mut self, _feed: PlaybackFeed) -> Result<()> {
        Err(AudioError::OutputConnect("NotAllowedError".to_string()))
    }

    fn disconnect(&mut self) {}

    fn is_connected(&self) -> bool {
        false
    }
}

#[derive(Default)]
struct Recorder {
    scales: Vec<f32>,
    cameras: Vec<Vec3>,
}

impl SceneTarget for Recorder {
    fn set_scale(&mut self, scale: f32) {
        self.scales.push(scale);
    }

    fn set_distort(&mut self, distort: f32) {
        assert!((0.0..=1.0).contains(&distort));
    }

    fn set_camera_position(&mut self, position: Vec3) {
        self.cameras.push(position);
    }
}

#[test]
fn reduce_matches_reference_mean() {
    let snapshot = [10u8, 20, 30, 40, 50, 60, 70, 80, 90, 100];
    assert_eq!(reduce(&snapshot, 10), 55.0);
}

#[test]
fn denied_output_keeps_visuals_running() {
    let clock = ManualClock::new();
    let mut session = AudioSession::with_clock(
        AnalyzerConfig::default(),
        Box::new(PermissionDenied),
        Box::new(clock.clone()),
    )
    .unwrap();

    session.open(&pulse_wav(8000, 1.0)).unwrap();
    assert_eq!(session.connect().unwrap(), OutputStatus::Muted);

    clock.advance(Duration::from_millis(120));
    assert!(session.tick().unwrap() > 0.0);

    session.close();
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn bass_pulse_drives_scale_up_and_down() {
    let clock = ManualClock::new();
    let asset = Arc::new(decode(&pulse_wav(8000, 1.0)).unwrap());
    let mut scene = Scene::start_with_clock(
        &AppConfig::default(),
        Box::new(NullSink::new()),
        Box::new(clock.clone()),
        asset,
    )
    .unwrap();
    let mut recorder = Recorder::default();

    // Two full pulse cycles at 60 fps
    for _ in 0..60 {
        clock.advance(Duration::from_micros(16_667));
        scene.frame(&mut recorder);
    }

    let max = recorder.scales.iter().cloned().fold(f32::MIN, f32::max);
    let min_after_first_pulse = recorder.scales[20..]
        .iter()
        .cloned()
        .fold(f32::MAX, f32::min);
    assert!(max > 1.2, "max scale {}", max);
    assert!(min_after_first_pulse < max - 0.1);
}

#[test]
fn scrolling_moves_camera_between_targets() {
    let clock = ManualClock::new();
    let config = AppConfig::default();
    let asset = Arc::new(decode(&pulse_wav(8000, 0.5)).unwrap());
    let mut scene = Scene::start_with_clock(
        &config,
        Box::new(NullSink::new()),
        Box::new(clock.clone()),
        asset,
    )
    .unwrap();
    let mut recorder = Recorder::default();

    scene.on_wheel(120.0);
    assert_eq!(scene.camera().state(), CameraState::Near);
    for _ in 0..120 {
        clock.advance(Duration::from_millis(16));
        scene.frame(&mut recorder);
    }
    let near = *recorder.cameras.last().unwrap();
    assert!(near.distance(config.camera.near_target) < 0.01);

    scene.on_wheel(-120.0);
    assert_eq!(scene.camera().state(), CameraState::Far);
    for _ in 0..5 {
        scene.frame(&mut recorder);
    }
    let drifting = *recorder.cameras.last().unwrap();
    assert!(drifting.distance(config.camera.far_target) < near.distance(config.camera.far_target));

    scene.close();
}

#[test]
fn tick_before_open_never_panics() {
    let mut session =
        AudioSession::new(AnalyzerConfig::default(), Box::new(NullSink::new())).unwrap();
    assert!(matches!(
        session.tick(),
        Err(AudioError::InvalidState { .. })
    ));
}
