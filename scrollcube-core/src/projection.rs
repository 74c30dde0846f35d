/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub near: f32,
    pub far: f32,
    pub projection: Projection,
}

impl Camera {
    /// Side-on orthographic view of the cube, looking down from above
    pub fn scene() -> Self {
        Self {
            position: Point3::new(5.0, 4.0, -5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            near: 0.1,
            far: 1000.0,
            projection: Projection::Orthographic {
                left: -5.0,
                right: 5.0,
                bottom: -5.0,
                top: 5.0,
            },
        }
    }

    /// Orthographic shadow camera for a directional light
    pub fn shadow(position: Point3<f32>, target: Point3<f32>) -> Self {
        let dir = (target - position).normalize();
        // Fall back to +Z as up when the light looks straight up or down
        let up = if dir.cross(&Vector3::y()).norm() < 1e-4 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        Self {
            position,
            target,
            up,
            near: 0.5,
            far: 500.0,
            projection: Projection::Orthographic {
                left: -5.0,
                right: 5.0,
                bottom: -5.0,
                top: 5.0,
            },
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
            } => Matrix4::new_orthographic(left, right, bottom, top, self.near, self.far),
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Direction the camera looks along
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    /// Project a 3D point to 2D screen space.
    ///
    /// Returns `(x, y, depth)` with depth in NDC (-1 near, 1 far), or `None`
    /// when the point falls outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.view_projection() * model_matrix;
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero w
        if clip.w.abs() < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;

        // Clip test
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::scene()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_camera() {
        let camera = Camera::scene();
        assert!(matches!(camera.projection, Projection::Orthographic { .. }));
        let (x, y, _) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 210, 210)
            .expect("origin is in view");
        assert!((x - 105.0).abs() < 1e-3);
        assert!((y - 105.0).abs() < 1e-3);
    }

    #[test]
    fn test_lifted_cube_leaves_frustum() {
        let camera = Camera::scene();
        let lifted = Matrix4::new_translation(&Vector3::new(0.0, 9.2, 0.0));
        let bottom = Point3::new(0.0, -2.0, 0.0);
        assert!(camera.project_to_screen(&bottom, &lifted, 210, 210).is_none());
        assert!(camera.project_to_screen(&bottom, &Matrix4::identity(), 210, 210).is_some());
    }

    #[test]
    fn test_shadow_camera_overhead() {
        let camera = Camera::shadow(Point3::new(0.0, 10.0, 0.0), Point3::origin());
        assert_eq!(camera.up, Vector3::z());
        let view = camera.view_matrix();
        assert!(view.iter().all(|v| v.is_finite()));
        assert!((camera.forward() + Vector3::y()).norm() < 1e-6);
    }
}
