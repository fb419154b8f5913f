//! Vibesphere library - audio-reactive sphere and scroll camera
//!
//! A looping track is analyzed frame by frame; its bass energy scales and
//! distorts a mesh while the camera eases between two scroll-selected
//! positions. Rendering itself stays behind [`frame::SceneTarget`].

pub mod audio;
pub mod camera;
pub mod cli;
pub mod error;
pub mod frame;
pub mod params;
pub mod scene;

pub use error::{AudioError, Result};
