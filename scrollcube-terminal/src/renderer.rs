/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use std::io::Write;
use scrollcube_core::scene::PLANE_Y;
use scrollcube_core::{Camera, FrameState, Mesh, SceneLights, Triangle};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Shadow density ramp (faintest to darkest), disjoint from the cube ramp
const SHADOW_RAMP: &[char] = &['`', ',', ';', 'x'];

/// Light every face receives regardless of orientation
const AMBIENT: f32 = 0.15;

/// Footprint scale standing in for the soft shadow penumbra
const SHADOW_SPREAD: f32 = 1.2;

/// Half the cube's side, for the shadow footprint
const CUBE_HALF: f32 = 2.0;

/// ASCII renderer that converts the cube scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

/// Square region of the terminal the camera maps onto.
/// Terminal cells are about twice as tall as wide.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    x: f32,
    y: f32,
    width: u32,
    height: u32,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.char_buffer[y * self.width + x])
        } else {
            None
        }
    }

    fn viewport(&self) -> Viewport {
        let width = self.width.min(self.height * 2);
        let height = width / 2;
        Viewport {
            x: ((self.width - width) / 2) as f32,
            y: ((self.height - height) / 2) as f32,
            width: width as u32,
            height: height as u32,
        }
    }

    fn project(&self, camera: &Camera, point: &Point3<f32>, model: &Matrix4<f32>) -> Option<(f32, f32, f32)> {
        let vp = self.viewport();
        camera
            .project_to_screen(point, model, vp.width, vp.height)
            .map(|(x, y, z)| (x + vp.x, y + vp.y, z))
    }

    /// Draw one frame: the contact shadow first, then the cube over it.
    ///
    /// `shadow_strength` is the shadow opacity relative to its maximum.
    pub fn render_frame(&mut self, mesh: &Mesh, frame: &FrameState, camera: &Camera, shadow_strength: f32) {
        if shadow_strength > 0.0 {
            self.render_shadow(frame.cube_transform.rotation.y, shadow_strength, camera);
        }

        let normal_matrix = frame.cube_transform.normal_matrix();
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, &frame.cube_model, &normal_matrix, &frame.lights, camera);
        }
    }

    /// The overhead light casts straight down, so the shadow is the cube's
    /// footprint turned by its yaw.
    fn render_shadow(&mut self, yaw: f32, strength: f32, camera: &Camera) {
        let rotation = Matrix4::new_rotation(Vector3::new(0.0, yaw, 0.0));
        let half = CUBE_HALF * SHADOW_SPREAD;
        let corners = [(-half, -half), (half, -half), (half, half), (-half, half)].map(|(x, z)| {
            rotation.transform_point(&Point3::new(x, PLANE_Y, z))
        });

        let index = (strength.clamp(0.0, 1.0) * (SHADOW_RAMP.len() - 1) as f32).round() as usize;
        let character = SHADOW_RAMP[index.min(SHADOW_RAMP.len() - 1)];

        let identity = Matrix4::identity();
        let mut screen = Vec::with_capacity(4);
        for corner in &corners {
            match self.project(camera, corner, &identity) {
                Some(p) => screen.push(p),
                None => return,
            }
        }
        self.rasterize_triangle(&[screen[0], screen[1], screen[2]], character);
        self.rasterize_triangle(&[screen[0], screen[2], screen[3]], character);
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        normal_matrix: &Matrix3<f32>,
        lights: &SceneLights,
        camera: &Camera,
    ) {
        // Orthographic view: faces pointing away from the camera are hidden
        let normal = normal_matrix * triangle.calculate_normal();
        if normal.dot(&camera.forward()) >= 0.0 {
            return;
        }

        // Project vertices to screen space
        let mut screen_coords = Vec::with_capacity(3);
        for vertex in &triangle.vertices {
            match self.project(camera, &vertex.position, model_matrix) {
                Some(coords) => screen_coords.push(coords),
                None => return, // Triangle is clipped
            }
        }

        let brightness = shade(&normal, lights);

        // Map brightness to character, keeping lit faces off the blank cell
        let steps = (LUMINOSITY_RAMP.len() - 1) as f32;
        let char_index = ((brightness * steps) as usize).clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        // Rasterize triangle using scanline algorithm
        self.rasterize_triangle(&screen_coords, character);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32)], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Color based on character intensity
                let color = match c {
                    '`' | ',' | ';' | 'x' => Color::DarkGrey,
                    ' ' | '.' | ':' => Color::Grey,
                    '-' | '=' => Color::White,
                    '+' | '*' => Color::Yellow,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Lambert brightness of a world-space face normal under both lights
fn shade(normal: &Vector3<f32>, lights: &SceneLights) -> f32 {
    let mut brightness = AMBIENT;
    for light in [&lights.key, &lights.orbit] {
        brightness += light.intensity * normal.dot(&-light.direction()).max(0.0);
    }
    brightness.clamp(0.0, 1.0)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollcube_core::{CubeConfig, CubeScene, RoundedBox, ScrollInput};

    fn frame_for(canvas_top: f32) -> FrameState {
        let mut scene = CubeScene::new(CubeConfig::default());
        scene.mark_ready();
        scene.on_scroll(ScrollInput::new(canvas_top, 0.0));
        scene.on_frame(0.0).unwrap()
    }

    fn shadow_cells(renderer: &AsciiRenderer) -> usize {
        renderer.char_buffer.iter().filter(|c| SHADOW_RAMP.contains(c)).count()
    }

    #[test]
    fn test_resting_cube_covers_centre() {
        let mesh = RoundedBox::new(4.0, 4.0, 4.0, 2, 0.2).build();
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_frame(&mesh, &frame_for(100.0), &Camera::scene(), 1.0);
        let c = renderer.char_at(40, 20).unwrap();
        assert!(LUMINOSITY_RAMP[1..].contains(&c));
    }

    #[test]
    fn test_lifted_cube_clears_centre() {
        let mesh = RoundedBox::new(4.0, 4.0, 4.0, 2, 0.2).build();
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_frame(&mesh, &frame_for(400.0), &Camera::scene(), 0.0);
        assert_eq!(renderer.char_at(40, 20), Some(' '));
        assert_eq!(shadow_cells(&renderer), 0);
    }

    #[test]
    fn test_shadow_visible_while_cube_rises() {
        let mesh = RoundedBox::new(4.0, 4.0, 4.0, 2, 0.2).build();
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_frame(&mesh, &frame_for(243.5), &Camera::scene(), 0.5);
        assert!(shadow_cells(&renderer) > 0);

        renderer.clear();
        assert_eq!(shadow_cells(&renderer), 0);
    }

    #[test]
    fn test_shade_bounds() {
        let lights = SceneLights::default();
        let up = shade(&Vector3::y(), &lights);
        let down = shade(&-Vector3::y(), &lights);
        assert!(up > down);
        assert!((down - AMBIENT).abs() < 1e-6);
        assert!(up <= 1.0);
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }
}
