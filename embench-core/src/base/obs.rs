//! Observation.
use image::RgbImage;
use std::collections::HashMap;

/// Key of the egocentric RGB camera.
pub const HEAD_RGB: &str = "head_rgb";

/// RGB frames of an environment, keyed by camera name.
#[derive(Clone, Debug, Default)]
pub struct Observation {
    frames: HashMap<String, RgbImage>,
}

impl Observation {
    /// Returns an observation without frames.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns an observation holding a black square frame under `key`.
    pub fn zeros(key: impl Into<String>, resolution: u32) -> Self {
        Self::from_frame(key, RgbImage::new(resolution, resolution))
    }

    /// Returns an observation holding a single frame.
    pub fn from_frame(key: impl Into<String>, frame: RgbImage) -> Self {
        let mut obs = Self::empty();
        obs.insert(key, frame);
        obs
    }

    /// Inserts a frame, replacing the previous one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, frame: RgbImage) {
        self.frames.insert(key.into(), frame);
    }

    /// Returns the frame of the given camera.
    pub fn frame(&self, key: &str) -> Option<&RgbImage> {
        self.frames.get(key)
    }

    /// Returns the names of the cameras in this observation.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.frames.keys()
    }

    /// `true` when no frame is held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
