/// Directional lights and the orbiting highlight
use nalgebra::{Point3, Vector3};
use serde::Deserialize;

/// A directional light aimed from `position` at `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
    pub casts_shadow: bool,
}

impl DirectionalLight {
    pub fn new(position: Point3<f32>, intensity: f32) -> Self {
        Self {
            position,
            target: Point3::origin(),
            color: [1.0, 1.0, 1.0],
            intensity,
            casts_shadow: false,
        }
    }

    /// Unit vector the light travels along (from position towards target)
    pub fn direction(&self) -> Vector3<f32> {
        let dir = self.target - self.position;
        if dir.norm_squared() < 1e-12 {
            return -Vector3::y();
        }
        dir.normalize()
    }

    /// Color premultiplied by intensity
    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

/// Circular path of the highlight light in the horizontal plane
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightOrbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per millisecond of wall-clock time
    pub angular_rate: f64,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            radius: 5.0,
            height: 5.0,
            angular_rate: 0.001,
        }
    }
}

impl LightOrbit {
    /// Position on the orbit at wall-clock time `time_ms`.
    ///
    /// `time_ms` is an epoch timestamp, far too large for f32, so the angle
    /// is reduced in f64 before narrowing.
    pub fn position_at(&self, time_ms: f64) -> Point3<f32> {
        let angle = (time_ms * self.angular_rate).rem_euclid(std::f64::consts::TAU);
        Point3::new(
            self.radius * angle.cos() as f32,
            self.height,
            self.radius * angle.sin() as f32,
        )
    }

    /// Move `light` onto the orbit and re-aim it at the world origin
    pub fn update(&self, light: &mut DirectionalLight, time_ms: f64) {
        light.position = self.position_at(time_ms);
        light.target = Point3::origin();
    }
}

/// The two lights of the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLights {
    /// Overhead light; the only shadow caster
    pub key: DirectionalLight,
    /// Light that follows `LightOrbit`
    pub orbit: DirectionalLight,
}

impl Default for SceneLights {
    fn default() -> Self {
        let mut key = DirectionalLight::new(Point3::new(0.0, 10.0, 0.0), 0.5);
        key.casts_shadow = true;
        Self {
            key,
            orbit: DirectionalLight::new(Point3::new(5.0, 10.0, 7.5), 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_start() {
        let p = LightOrbit::default().position_at(0.0);
        assert!((p - Point3::new(5.0, 5.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_orbit_quarter_turn() {
        let t = std::f64::consts::FRAC_PI_2 * 1000.0;
        let p = LightOrbit::default().position_at(t);
        assert!((p - Point3::new(0.0, 5.0, 5.0)).norm() < 1e-5);
    }

    #[test]
    fn test_orbit_radius_for_epoch_times() {
        let orbit = LightOrbit::default();
        for t in [1.7e12, 1.7e12 + 16.0, 2.0e12 + 123.456] {
            let p = orbit.position_at(t);
            assert!(((p.x * p.x + p.z * p.z).sqrt() - 5.0).abs() < 1e-4);
            assert_eq!(p.y, 5.0);
        }
    }

    #[test]
    fn test_update_aims_at_origin() {
        let mut light = DirectionalLight::new(Point3::new(1.0, 2.0, 3.0), 1.0);
        light.target = Point3::new(4.0, 4.0, 4.0);
        LightOrbit::default().update(&mut light, 0.0);
        assert_eq!(light.target, Point3::origin());
        let expected = -Vector3::new(5.0, 5.0, 0.0).normalize();
        assert!((light.direction() - expected).norm() < 1e-6);
    }

    #[test]
    fn test_default_lights() {
        let lights = SceneLights::default();
        assert!(lights.key.casts_shadow);
        assert!(!lights.orbit.casts_shadow);
        assert!((lights.key.direction() + Vector3::y()).norm() < 1e-6);
        assert_eq!(lights.key.radiance(), [0.5, 0.5, 0.5]);
    }
}
