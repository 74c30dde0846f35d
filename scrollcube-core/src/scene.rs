/// Scene state driven by scroll and frame callbacks.
///
/// `CubeScene` is created before any asset has loaded and is handed to both
/// the scroll handler and the frame loop straight away. Until `mark_ready`
/// is called it owns no scene nodes, and every callback is a no-op.
use nalgebra::{Matrix4, Vector3};

use crate::config::CubeConfig;
use crate::light::{LightOrbit, SceneLights};
use crate::material::ShadowMaterial;
use crate::scroll::{CubePose, ScrollConfig, ScrollInput};
use crate::transform::{RotationState, Transform};

/// Height of the shadow-catching plane
pub const PLANE_Y: f32 = -2.0;

/// Everything the renderer reads back for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub cube_model: Matrix4<f32>,
    pub cube_transform: Transform,
    pub plane_model: Matrix4<f32>,
    pub shadow_opacity: f32,
    pub lights: SceneLights,
}

/// Owner of the mutable scene nodes once assets are in
#[derive(Debug, Clone)]
pub struct SceneController {
    scroll: ScrollConfig,
    orbit: LightOrbit,
    cube: Transform,
    plane: Transform,
    shadow: ShadowMaterial,
    lights: SceneLights,
}

impl SceneController {
    pub fn new(scroll: ScrollConfig, orbit: LightOrbit) -> Self {
        Self {
            scroll,
            orbit,
            cube: Transform::default(),
            plane: Transform::new(
                Vector3::new(0.0, PLANE_Y, 0.0),
                RotationState::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            ),
            shadow: ShadowMaterial::default(),
            lights: SceneLights::default(),
        }
    }

    /// Map a scroll measurement and write the result onto the scene
    pub fn on_scroll(&mut self, input: ScrollInput) -> CubePose {
        let pose = self.scroll.map(input);
        self.apply(pose);
        pose
    }

    pub fn apply(&mut self, pose: CubePose) {
        self.cube.position.y = pose.cube_y;
        self.cube.rotation.y = pose.cube_yaw;
        self.shadow.opacity = pose.shadow_opacity;
    }

    /// Advance the orbiting light to `time_ms` and snapshot the scene
    pub fn on_frame(&mut self, time_ms: f64) -> FrameState {
        self.orbit.update(&mut self.lights.orbit, time_ms);
        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameState {
        FrameState {
            cube_model: self.cube.model_matrix(),
            cube_transform: self.cube,
            plane_model: self.plane.model_matrix(),
            shadow_opacity: self.shadow.opacity,
            lights: self.lights,
        }
    }

    pub fn cube(&self) -> &Transform {
        &self.cube
    }

    pub fn shadow(&self) -> &ShadowMaterial {
        &self.shadow
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Uninitialized {
        /// Most recent scroll seen before the scene existed
        pending: Option<ScrollInput>,
    },
    Ready(SceneController),
}

/// Two-phase scene handle shared by the page callbacks
#[derive(Debug, Clone)]
pub struct CubeScene {
    config: CubeConfig,
    phase: Phase,
}

impl CubeScene {
    pub fn new(config: CubeConfig) -> Self {
        Self {
            config,
            phase: Phase::Uninitialized { pending: None },
        }
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    pub fn controller(&self) -> Option<&SceneController> {
        match &self.phase {
            Phase::Ready(controller) => Some(controller),
            Phase::Uninitialized { .. } => None,
        }
    }

    /// Build the scene nodes. Calling it again keeps the existing scene.
    pub fn mark_ready(&mut self) {
        if let Phase::Uninitialized { pending } = self.phase {
            let mut controller = SceneController::new(self.config.scroll, self.config.light);
            if let Some(input) = pending {
                controller.on_scroll(input);
            }
            log::info!("cube scene ready");
            self.phase = Phase::Ready(controller);
        }
    }

    /// Scroll callback. Before the scene is ready the input is only remembered.
    pub fn on_scroll(&mut self, input: ScrollInput) -> Option<CubePose> {
        match &mut self.phase {
            Phase::Ready(controller) => Some(controller.on_scroll(input)),
            Phase::Uninitialized { pending } => {
                log::trace!("scroll before scene is ready: {:?}", input);
                *pending = Some(input);
                None
            }
        }
    }

    /// Frame callback
    pub fn on_frame(&mut self, time_ms: f64) -> Option<FrameState> {
        match &mut self.phase {
            Phase::Ready(controller) => Some(controller.on_frame(time_ms)),
            Phase::Uninitialized { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_callbacks_are_noops_until_ready() {
        let mut scene = CubeScene::new(CubeConfig::default());
        assert!(!scene.is_ready());
        assert!(scene.on_scroll(ScrollInput::new(200.0, 0.0)).is_none());
        assert!(scene.on_frame(0.0).is_none());
        assert!(scene.controller().is_none());
    }

    #[test]
    fn test_initial_node_state() {
        let mut scene = CubeScene::new(CubeConfig::default());
        scene.mark_ready();
        let controller = scene.controller().unwrap();
        assert_eq!(controller.cube().position, Vector3::zeros());
        assert_eq!(controller.cube().rotation, RotationState::zero());
        assert_eq!(controller.shadow().opacity, 0.0);
    }

    #[test]
    fn test_pending_scroll_applied_on_ready() {
        let mut scene = CubeScene::new(CubeConfig::default());
        scene.on_scroll(ScrollInput::new(500.0, 0.0));
        scene.on_scroll(ScrollInput::new(100.0, 550.0));
        scene.mark_ready();

        let controller = scene.controller().unwrap();
        assert_eq!(controller.cube().position.y, 0.0);
        assert_eq!(controller.shadow().opacity, 0.2);
        assert!((controller.cube().rotation.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mark_ready_is_idempotent() {
        let mut scene = CubeScene::new(CubeConfig::default());
        scene.mark_ready();
        scene.on_scroll(ScrollInput::new(243.5, 0.0));
        scene.mark_ready();
        assert!((scene.controller().unwrap().cube().position.y - 4.6).abs() < 1e-5);
    }

    #[test]
    fn test_scroll_writes_scene_nodes() {
        let mut scene = CubeScene::new(CubeConfig::default());
        scene.mark_ready();
        let pose = scene.on_scroll(ScrollInput::new(400.0, 450.0)).unwrap();
        assert_eq!(pose.cube_y, 9.2);
        assert_eq!(pose.shadow_opacity, 0.0);

        let frame = scene.on_frame(0.0).unwrap();
        assert_eq!(frame.shadow_opacity, 0.0);
        assert_eq!(frame.cube_transform.position.y, 9.2);
        assert!((frame.cube_transform.rotation.y - 0.5).abs() < 1e-5);
        let origin = frame.cube_model.transform_point(&Point3::origin());
        assert!((origin.y - 9.2).abs() < 1e-5);
    }

    #[test]
    fn test_frame_moves_orbit_light_only() {
        let mut scene = CubeScene::new(CubeConfig::default());
        scene.mark_ready();
        let a = scene.on_frame(0.0).unwrap();
        let b = scene.on_frame(1000.0).unwrap();
        assert_ne!(a.lights.orbit.position, b.lights.orbit.position);
        assert_eq!(a.lights.key, b.lights.key);
        assert_eq!(b.lights.orbit.target, Point3::origin());
        assert_eq!(a.lights.orbit.position.y, 5.0);
    }

    #[test]
    fn test_plane_sits_below_cube() {
        let controller = SceneController::new(ScrollConfig::default(), LightOrbit::default());
        let frame = controller.snapshot();
        let p = frame.plane_model.transform_point(&Point3::new(5.0, 5.0, 0.0));
        assert!((p.y - PLANE_Y).abs() < 1e-5);
    }
}
