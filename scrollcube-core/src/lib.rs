/// scrollcube core library - scroll mapping, scene state and asset decoding
///
/// Everything in here is target independent: the web front-end and the
/// terminal preview both drive the same `CubeScene` and read back the
/// same `FrameState` every frame.

pub mod assets;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hdr;
pub mod light;
pub mod material;
pub mod projection;
pub mod scene;
pub mod scroll;
pub mod transform;

// Re-export commonly used types
pub use assets::{AssetManifest, AssetState, AssetTracker};
pub use config::{CanvasConfig, CubeConfig};
pub use error::{Error, Result};
pub use geometry::{FaceGroup, Mesh, RoundedBox, Triangle, Vertex};
pub use hdr::HdrImage;
pub use light::{DirectionalLight, LightOrbit, SceneLights};
pub use material::{CubeMaterials, FaceTexture, ShadowMaterial, StandardMaterial};
pub use projection::{Camera, Projection};
pub use scene::{CubeScene, FrameState, SceneController};
pub use scroll::{CubePose, ScrollConfig, ScrollInput};
pub use transform::{RotationState, Transform};
