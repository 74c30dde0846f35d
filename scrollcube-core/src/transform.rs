/// Scene node transforms
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Euler rotation around three axes (in radians), applied X then Y then Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotation matrix; the composed order matches an intrinsic XYZ euler
    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));

        rx * ry * rz
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Position and orientation of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: RotationState,
}

impl Transform {
    pub fn new(position: Vector3<f32>, rotation: RotationState) -> Self {
        Self { position, rotation }
    }

    /// Model matrix: rotate about the local origin, then translate
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position) * self.rotation.matrix()
    }

    /// Matrix for transforming normals (rotation only, no scale is ever applied)
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        self.rotation.matrix().fixed_view::<3, 3>(0, 0).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_rotation() {
        let matrix = RotationState::zero().matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_yaw_then_translate() {
        let transform = Transform::new(
            Vector3::new(0.0, 4.6, 0.0),
            RotationState::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        );
        // +X rotated a quarter turn about Y lands on -Z, then lifts
        let p = transform.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 4.6, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_plane_lies_flat() {
        let plane = Transform::new(
            Vector3::new(0.0, -2.0, 0.0),
            RotationState::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
        );
        // Plane normal +Z tips over to +Y
        let n = plane.normal_matrix() * Vector3::z();
        assert!((n - Vector3::y()).norm() < 1e-6);
    }
}
