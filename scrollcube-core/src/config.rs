/// Page-level configuration.
///
/// Every field has a default matching the landing page, so callers only
/// pass the keys they want to override, e.g.
/// `{"scroll": {"max_offset_top": 400}}`.
use serde::Deserialize;

use crate::assets::AssetManifest;
use crate::error::{Error, Result};
use crate::light::LightOrbit;
use crate::scroll::ScrollConfig;

/// Canvas element and output settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// DOM id of the canvas
    pub id: String,
    /// Square CSS size of the canvas
    pub size_px: u32,
    /// Upper bound on the device pixel ratio used for the drawing buffer
    pub max_pixel_ratio: f64,
    /// Tone mapping exposure
    pub exposure: f32,
    /// Side length of the shadow depth map
    pub shadow_map_size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            id: "cube-canvas".to_string(),
            size_px: 210,
            max_pixel_ratio: 2.0,
            exposure: 1.0,
            shadow_map_size: 1024,
        }
    }
}

impl CanvasConfig {
    /// Drawing buffer side length for a given device pixel ratio
    pub fn buffer_size(&self, device_pixel_ratio: f64) -> u32 {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(self.max_pixel_ratio)
        } else {
            1.0
        };
        (self.size_px as f64 * ratio).round().max(1.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub scroll: ScrollConfig,
    pub light: LightOrbit,
    pub canvas: CanvasConfig,
    pub assets: AssetManifest,
}

impl CubeConfig {
    /// Parse and validate a JSON override document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CubeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scroll.validate()?;
        if !(self.light.radius.is_finite() && self.light.height.is_finite() && self.light.angular_rate.is_finite()) {
            return Err(Error::InvalidConfig("light orbit must be finite".to_string()));
        }
        if self.canvas.id.is_empty() {
            return Err(Error::InvalidConfig("canvas.id must not be empty".to_string()));
        }
        if self.canvas.size_px == 0 || self.canvas.shadow_map_size == 0 {
            return Err(Error::InvalidConfig(
                "canvas.size_px and canvas.shadow_map_size must be positive".to_string(),
            ));
        }
        if !(self.canvas.max_pixel_ratio > 0.0 && self.canvas.exposure > 0.0) {
            return Err(Error::InvalidConfig(
                "canvas.max_pixel_ratio and canvas.exposure must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = CubeConfig::from_json("{}").unwrap();
        assert_eq!(config, CubeConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = CubeConfig::from_json(r#"{"scroll": {"max_offset_top": 400}, "canvas": {"id": "hero"}}"#).unwrap();
        assert_eq!(config.scroll.max_offset_top, 400.0);
        assert_eq!(config.scroll.min_offset_top, 160.0);
        assert_eq!(config.canvas.id, "hero");
        assert_eq!(config.canvas.size_px, 210);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            CubeConfig::from_json(r#"{"scroll": {"min_offset_top": 500}}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(CubeConfig::from_json("not json"), Err(Error::Json(_))));
        assert!(CubeConfig::from_json(r#"{"canvas": {"size_px": 0}}"#).is_err());
    }

    #[test]
    fn test_buffer_size_caps_pixel_ratio() {
        let canvas = CanvasConfig::default();
        assert_eq!(canvas.buffer_size(1.0), 210);
        assert_eq!(canvas.buffer_size(1.5), 315);
        assert_eq!(canvas.buffer_size(3.0), 420);
        assert_eq!(canvas.buffer_size(f64::NAN), 210);
    }
}
