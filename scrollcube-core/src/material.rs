/// Surface materials for the cube and its shadow catcher

/// Which of the three face images a material samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceTexture {
    Top,
    Left,
    Right,
}

impl FaceTexture {
    pub const ALL: [FaceTexture; 3] = [FaceTexture::Top, FaceTexture::Left, FaceTexture::Right];

    pub fn index(self) -> usize {
        match self {
            FaceTexture::Top => 0,
            FaceTexture::Left => 1,
            FaceTexture::Right => 2,
        }
    }
}

/// Split a `0xRRGGBB` color into linear 0..1 channels
pub fn rgb_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Metal/rough material lit by the lights and the environment map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub env_map_intensity: f32,
    /// Texture used for both albedo and emission
    pub map: Option<FaceTexture>,
}

impl StandardMaterial {
    /// Bright, slightly metallic lacquer shared by every face
    pub fn cube_base() -> Self {
        Self {
            color: rgb_hex(0xffffff),
            emissive: rgb_hex(0x222222),
            emissive_intensity: 1.0,
            roughness: 0.1,
            metalness: 0.6,
            env_map_intensity: 1.5,
            map: None,
        }
    }

    pub fn with_map(mut self, texture: FaceTexture) -> Self {
        self.map = Some(texture);
        self
    }
}

/// Invisible surface that only darkens where shadows land
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMaterial {
    pub opacity: f32,
}

impl Default for ShadowMaterial {
    fn default() -> Self {
        Self { opacity: 0.0 }
    }
}

/// Per-face materials of the cube, indexed like `RoundedBox` face groups
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMaterials {
    pub faces: [StandardMaterial; 6],
}

impl Default for CubeMaterials {
    fn default() -> Self {
        let base = StandardMaterial::cube_base();
        let left = base.with_map(FaceTexture::Left);
        let top = base.with_map(FaceTexture::Top);
        let right = base.with_map(FaceTexture::Right);
        // +X, -X, +Y, -Y, +Z, -Z
        Self {
            faces: [left, left, top, top, right, right],
        }
    }
}

impl CubeMaterials {
    pub fn for_group(&self, material: usize) -> Option<&StandardMaterial> {
        self.faces.get(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(rgb_hex(0xffffff), [1.0, 1.0, 1.0]);
        let e = rgb_hex(0x222222);
        assert!((e[0] - 34.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_face_assignment() {
        let materials = CubeMaterials::default();
        let maps: Vec<_> = materials.faces.iter().map(|m| m.map).collect();
        assert_eq!(
            maps,
            vec![
                Some(FaceTexture::Left),
                Some(FaceTexture::Left),
                Some(FaceTexture::Top),
                Some(FaceTexture::Top),
                Some(FaceTexture::Right),
                Some(FaceTexture::Right),
            ]
        );
        assert!(materials.for_group(6).is_none());
        assert_eq!(materials.for_group(2).map(|m| m.roughness), Some(0.1));
    }
}
