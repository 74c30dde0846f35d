/// Scroll-to-transform mapping
///
/// Turns the canvas's on-screen position and the page scroll offset into the
/// cube's height above its resting point, the opacity of its contact shadow,
/// and its yaw. The height and opacity ramps are clamped between two canvas
/// offsets; the yaw ramp starts at a fixed scroll offset and never stops.
use serde::Deserialize;

use crate::error::{Error, Result};

/// Tunables for the scroll mapping (all in CSS pixels unless noted)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Canvas top at or below which the cube rests in full view
    pub min_offset_top: f32,
    /// Canvas top at or above which the cube is lifted out of the frustum
    pub max_offset_top: f32,
    /// Cube height (world units) once fully lifted
    pub cube_max_y: f32,
    /// Shadow opacity while the cube is resting
    pub max_shadow_opacity: f32,
    /// Page scroll offset where the yaw ramp starts
    pub yaw_start_scroll: f32,
    /// Radians of yaw per pixel scrolled past `yaw_start_scroll`
    pub yaw_rate: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            min_offset_top: 160.0,
            max_offset_top: 327.0,
            cube_max_y: 9.2,
            max_shadow_opacity: 0.2,
            yaw_start_scroll: 350.0,
            yaw_rate: 0.005,
        }
    }
}

impl ScrollConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("min_offset_top", self.min_offset_top),
            ("max_offset_top", self.max_offset_top),
            ("cube_max_y", self.cube_max_y),
            ("max_shadow_opacity", self.max_shadow_opacity),
            ("yaw_start_scroll", self.yaw_start_scroll),
            ("yaw_rate", self.yaw_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("scroll.{name} must be finite")));
            }
        }
        if self.min_offset_top >= self.max_offset_top {
            return Err(Error::InvalidConfig(format!(
                "scroll.min_offset_top ({}) must be below scroll.max_offset_top ({})",
                self.min_offset_top, self.max_offset_top
            )));
        }
        if !(0.0..=1.0).contains(&self.max_shadow_opacity) {
            return Err(Error::InvalidConfig(
                "scroll.max_shadow_opacity must be within 0..=1".to_string(),
            ));
        }
        Ok(())
    }

    /// Map one scroll measurement to the cube pose
    pub fn map(&self, input: ScrollInput) -> CubePose {
        let (cube_y, shadow_opacity) = self.lift(input.canvas_top);
        CubePose {
            cube_y,
            shadow_opacity,
            cube_yaw: self.yaw(input.scroll_y),
        }
    }

    /// Height and shadow opacity for a canvas top offset
    fn lift(&self, canvas_top: f32) -> (f32, f32) {
        if canvas_top <= self.min_offset_top {
            (0.0, self.max_shadow_opacity)
        } else if canvas_top >= self.max_offset_top || canvas_top.is_nan() {
            (self.cube_max_y, 0.0)
        } else {
            let t = (canvas_top - self.min_offset_top) / (self.max_offset_top - self.min_offset_top);
            (t * self.cube_max_y, (1.0 - t) * self.max_shadow_opacity)
        }
    }

    /// Unclamped yaw ramp
    fn yaw(&self, scroll_y: f32) -> f32 {
        if scroll_y > self.yaw_start_scroll {
            (scroll_y - self.yaw_start_scroll) * self.yaw_rate
        } else {
            0.0
        }
    }
}

/// One scroll measurement, taken fresh on every scroll event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInput {
    /// Distance from the viewport top to the canvas's top edge
    pub canvas_top: f32,
    /// Absolute vertical scroll offset of the page
    pub scroll_y: f32,
}

impl ScrollInput {
    pub fn new(canvas_top: f32, scroll_y: f32) -> Self {
        Self { canvas_top, scroll_y }
    }
}

/// Values written onto the scene after a scroll event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubePose {
    pub cube_y: f32,
    pub shadow_opacity: f32,
    pub cube_yaw: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn pose(canvas_top: f32, scroll_y: f32) -> CubePose {
        ScrollConfig::default().map(ScrollInput::new(canvas_top, scroll_y))
    }

    #[test]
    fn test_resting_below_min_offset() {
        for top in [-500.0, 0.0, 100.0, 159.9, 160.0] {
            let p = pose(top, 0.0);
            assert_eq!(p.cube_y, 0.0);
            assert_eq!(p.shadow_opacity, 0.2);
        }
    }

    #[test]
    fn test_lifted_above_max_offset() {
        for top in [327.0, 327.1, 400.0, 10_000.0] {
            let p = pose(top, 0.0);
            assert_eq!(p.cube_y, 9.2);
            assert_eq!(p.shadow_opacity, 0.0);
        }
    }

    #[test]
    fn test_midpoint() {
        let p = pose(243.5, 0.0);
        assert!((p.cube_y - 4.6).abs() < EPS);
        assert!((p.shadow_opacity - 0.1).abs() < EPS);
    }

    #[test]
    fn test_ramp_is_continuous_at_both_ends() {
        let below = pose(160.0 + 1e-3, 0.0);
        assert!(below.cube_y.abs() < 1e-3);
        assert!((below.shadow_opacity - 0.2).abs() < 1e-3);

        let above = pose(327.0 - 1e-3, 0.0);
        assert!((above.cube_y - 9.2).abs() < 1e-3);
        assert!(above.shadow_opacity.abs() < 1e-3);
    }

    #[test]
    fn test_yaw_ramp() {
        assert_eq!(pose(0.0, 0.0).cube_yaw, 0.0);
        assert_eq!(pose(0.0, 350.0).cube_yaw, 0.0);
        assert!((pose(0.0, 550.0).cube_yaw - 1.0).abs() < EPS);
        // No upper bound on the spin
        assert!((pose(0.0, 100_350.0).cube_yaw - 500.0).abs() < 1e-2);
    }

    #[test]
    fn test_monotonic_in_canvas_top() {
        let mut prev = pose(100.0, 0.0);
        let mut top = 100.0;
        while top < 400.0 {
            top += 0.5;
            let p = pose(top, 0.0);
            assert!(p.cube_y >= prev.cube_y);
            assert!(p.shadow_opacity <= prev.shadow_opacity);
            prev = p;
        }
    }

    #[test]
    fn test_yaw_independent_of_canvas_top() {
        assert_eq!(pose(100.0, 450.0).cube_yaw, pose(300.0, 450.0).cube_yaw);
    }

    #[test]
    fn test_nan_measurements() {
        let p = pose(f32::NAN, f32::NAN);
        assert_eq!(p.cube_y, 9.2);
        assert_eq!(p.shadow_opacity, 0.0);
        assert_eq!(p.cube_yaw, 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(ScrollConfig::default().validate().is_ok());

        let inverted = ScrollConfig {
            min_offset_top: 400.0,
            ..ScrollConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::InvalidConfig(_))));

        let infinite = ScrollConfig {
            yaw_rate: f32::INFINITY,
            ..ScrollConfig::default()
        };
        assert!(infinite.validate().is_err());
    }
}
