/// Static assets the cube needs and their load progress
use serde::Deserialize;

use crate::material::FaceTexture;

/// Relative URLs of the environment map and face images
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub environment: String,
    pub top: String,
    pub left: String,
    pub right: String,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            environment: "/cube-texture.hdr".to_string(),
            top: "/imgs/cube-top.jpg".to_string(),
            left: "/imgs/cube-left.jpg".to_string(),
            right: "/imgs/cube-right.jpg".to_string(),
        }
    }
}

impl AssetManifest {
    pub fn face(&self, texture: FaceTexture) -> &str {
        match texture {
            FaceTexture::Top => &self.top,
            FaceTexture::Left => &self.left,
            FaceTexture::Right => &self.right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetState {
    #[default]
    Pending,
    Loaded,
    Failed(String),
}

impl AssetState {
    /// Finished, whether or not it worked
    pub fn is_settled(&self) -> bool {
        !matches!(self, AssetState::Pending)
    }
}

/// Load progress of every asset in the manifest.
///
/// Failures are recorded and logged; a failed asset just stays unset.
#[derive(Debug, Clone, Default)]
pub struct AssetTracker {
    environment: AssetState,
    faces: [AssetState; 3],
}

impl AssetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> &AssetState {
        &self.environment
    }

    pub fn face(&self, texture: FaceTexture) -> &AssetState {
        &self.faces[texture.index()]
    }

    pub fn environment_loaded(&mut self) {
        log::info!("environment map loaded");
        self.environment = AssetState::Loaded;
    }

    pub fn environment_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("environment map failed to load: {}", reason);
        self.environment = AssetState::Failed(reason);
    }

    pub fn face_loaded(&mut self, texture: FaceTexture) {
        log::debug!("{:?} face texture loaded", texture);
        self.faces[texture.index()] = AssetState::Loaded;
    }

    pub fn face_failed(&mut self, texture: FaceTexture, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("{:?} face texture failed to load: {}", texture, reason);
        self.faces[texture.index()] = AssetState::Failed(reason);
    }

    pub fn all_settled(&self) -> bool {
        self.environment.is_settled() && self.faces.iter().all(AssetState::is_settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_paths() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.environment, "/cube-texture.hdr");
        assert_eq!(manifest.face(FaceTexture::Top), "/imgs/cube-top.jpg");
        assert_eq!(manifest.face(FaceTexture::Left), "/imgs/cube-left.jpg");
        assert_eq!(manifest.face(FaceTexture::Right), "/imgs/cube-right.jpg");
    }

    #[test]
    fn test_tracker_settles_on_failure() {
        let mut tracker = AssetTracker::new();
        assert!(!tracker.all_settled());

        tracker.environment_failed("404");
        tracker.face_loaded(FaceTexture::Top);
        tracker.face_loaded(FaceTexture::Left);
        assert!(!tracker.all_settled());

        tracker.face_failed(FaceTexture::Right, "decode error");
        assert!(tracker.all_settled());
        assert_eq!(tracker.environment(), &AssetState::Failed("404".to_string()));
        assert_eq!(tracker.face(FaceTexture::Left), &AssetState::Loaded);
    }
}
