/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector2, Vector3};

/// A 3D vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A contiguous run of triangles drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGroup {
    pub start: usize,
    pub count: usize,
    pub material: usize,
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
    pub groups: Vec<FaceGroup>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
            groups: Vec::new(),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Close the current run of triangles as a group using `material`
    fn close_group(&mut self, start: usize, material: usize) {
        let count = self.triangles.len() - start;
        if count > 0 {
            self.groups.push(FaceGroup {
                start,
                count,
                material,
            });
        }
    }

    /// Flat plane in the XY plane facing +Z, centred on the origin
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let n = Vector3::z();
        let v = |x: f32, y: f32, u: f32, t: f32| Vertex::new(Point3::new(x, y, 0.0), n, Vector2::new(u, t));

        let mut mesh = Self::with_capacity(2);
        mesh.add_triangle(Triangle::new(v(-hw, -hh, 0.0, 0.0), v(hw, -hh, 1.0, 0.0), v(hw, hh, 1.0, 1.0)));
        mesh.add_triangle(Triangle::new(v(-hw, -hh, 0.0, 0.0), v(hw, hh, 1.0, 1.0), v(-hw, hh, 0.0, 1.0)));
        mesh.close_group(0, 0);
        mesh
    }

    /// Interleaved `position.xyz, normal.xyz, uv.xy` per vertex, three per triangle
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.triangles.len() * 3 * 8);
        for triangle in &self.triangles {
            for v in &triangle.vertices {
                out.extend_from_slice(&[
                    v.position.x,
                    v.position.y,
                    v.position.z,
                    v.normal.x,
                    v.normal.y,
                    v.normal.z,
                    v.uv.x,
                    v.uv.y,
                ]);
            }
        }
        out
    }
}

/// Box with rounded edges and corners.
///
/// Each face is a grid whose outer bands are bent onto quarter-cylinders
/// and sphere octants of `radius`; the flat centre is a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedBox {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Subdivisions across each rounded band
    pub segments: u32,
    pub radius: f32,
}

/// Face frames in material order: +X, -X, +Y, -Y, +Z, -Z.
/// Each entry is (normal axis, normal sign, u axis, u sign, v axis).
const FACES: [(usize, f32, usize, f32, usize); 6] = [
    (0, 1.0, 2, -1.0, 1),
    (0, -1.0, 2, 1.0, 1),
    (1, 1.0, 0, 1.0, 2),
    (1, -1.0, 0, 1.0, 2),
    (2, 1.0, 0, 1.0, 1),
    (2, -1.0, 0, -1.0, 1),
];

impl RoundedBox {
    pub fn new(width: f32, height: f32, depth: f32, segments: u32, radius: f32) -> Self {
        Self {
            width,
            height,
            depth,
            segments,
            radius,
        }
    }

    /// The decorative cube: 4 units on a side, softly rounded
    pub fn cube() -> Self {
        Self::new(4.0, 4.0, 4.0, 16, 0.2)
    }

    fn half_extents(&self) -> Vector3<f32> {
        Vector3::new(self.width, self.height, self.depth) / 2.0
    }

    /// Radius clamped so the inner box never inverts
    fn effective_radius(&self) -> f32 {
        let h = self.half_extents();
        self.radius.max(0.0).min(h.x.min(h.y).min(h.z))
    }

    /// Grid coordinates along one axis: a band of `segments` cells at each
    /// end, joined by the flat middle cell.
    fn axis_stops(&self, half: f32, radius: f32) -> Vec<f32> {
        let segments = self.segments.max(1);
        let inner = half - radius;
        let band = (0..=segments).map(move |i| radius * i as f32 / segments as f32);
        let candidates = band.clone().map(|d| -half + d).chain(band.map(|d| inner + d));

        // Zero-width bands collapse onto one stop
        let mut stops: Vec<f32> = Vec::with_capacity(2 * segments as usize + 2);
        for s in candidates {
            if stops.last().map_or(true, |&last| s > last) {
                stops.push(s);
            }
        }
        stops
    }

    /// Bend a point on the sharp box onto the rounded surface
    fn round(&self, p: Vector3<f32>, face_normal: Vector3<f32>, radius: f32) -> (Point3<f32>, Vector3<f32>) {
        let inner = self.half_extents().add_scalar(-radius);
        let core = Vector3::new(
            p.x.clamp(-inner.x, inner.x),
            p.y.clamp(-inner.y, inner.y),
            p.z.clamp(-inner.z, inner.z),
        );
        let offset = p - core;
        let len = offset.norm();
        if len < 1e-6 {
            return (Point3::from(p), face_normal);
        }
        let normal = offset / len;
        (Point3::from(core + normal * radius), normal)
    }

    pub fn build(&self) -> Mesh {
        let half = self.half_extents();
        let radius = self.effective_radius();
        let mut mesh = Mesh::new();

        for (material, &(n_axis, n_sign, u_axis, u_sign, v_axis)) in FACES.iter().enumerate() {
            let start = mesh.triangles.len();
            let mut face_normal = Vector3::zeros();
            face_normal[n_axis] = n_sign;

            let u_stops = self.axis_stops(half[u_axis], radius);
            let v_stops = self.axis_stops(half[v_axis], radius);

            let vertex = |i: usize, j: usize| {
                let mut p = Vector3::zeros();
                p[n_axis] = n_sign * half[n_axis];
                p[u_axis] = u_sign * u_stops[i];
                p[v_axis] = v_stops[j];
                let uv = Vector2::new(
                    (u_stops[i] + half[u_axis]) / (2.0 * half[u_axis]),
                    (v_stops[j] + half[v_axis]) / (2.0 * half[v_axis]),
                );
                let (position, normal) = self.round(p, face_normal, radius);
                Vertex::new(position, normal, uv)
            };

            // Keep counter-clockwise winding when seen from outside
            let mut tangent_u = Vector3::zeros();
            tangent_u[u_axis] = u_sign;
            let mut tangent_v = Vector3::zeros();
            tangent_v[v_axis] = 1.0;
            let ccw = tangent_u.cross(&tangent_v).dot(&face_normal) > 0.0;

            for i in 0..u_stops.len() - 1 {
                for j in 0..v_stops.len() - 1 {
                    let (a, b, c, d) = (vertex(i, j), vertex(i + 1, j), vertex(i + 1, j + 1), vertex(i, j + 1));
                    if ccw {
                        mesh.add_triangle(Triangle::new(a, b, c));
                        mesh.add_triangle(Triangle::new(a, c, d));
                    } else {
                        mesh.add_triangle(Triangle::new(a, c, b));
                        mesh.add_triangle(Triangle::new(a, d, c));
                    }
                }
            }
            mesh.close_group(start, material);
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_groups() {
        let mesh = RoundedBox::cube().build();
        assert_eq!(mesh.groups.len(), 6);
        let materials: Vec<usize> = mesh.groups.iter().map(|g| g.material).collect();
        assert_eq!(materials, vec![0, 1, 2, 3, 4, 5]);
        let total: usize = mesh.groups.iter().map(|g| g.count).sum();
        assert_eq!(total, mesh.triangles.len());
    }

    #[test]
    fn test_vertices_within_bounds_with_unit_normals() {
        let mesh = RoundedBox::new(4.0, 4.0, 4.0, 4, 0.2).build();
        for triangle in &mesh.triangles {
            for v in &triangle.vertices {
                assert!(v.position.iter().all(|c| c.abs() <= 2.0 + 1e-5));
                assert!((v.normal.norm() - 1.0).abs() < 1e-5);
                assert!((0.0..=1.0).contains(&v.uv.x) && (0.0..=1.0).contains(&v.uv.y));
            }
        }
    }

    #[test]
    fn test_corners_are_rounded() {
        let mesh = RoundedBox::new(4.0, 4.0, 4.0, 4, 0.2).build();
        let max_dist = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.coords.norm())
            .fold(0.0f32, f32::max);
        let inner_corner = Vector3::new(1.8f32, 1.8, 1.8).norm();
        assert!((max_dist - (inner_corner + 0.2)).abs() < 1e-4);
    }

    #[test]
    fn test_winding_faces_outward() {
        let mesh = RoundedBox::new(4.0, 4.0, 4.0, 2, 0.2).build();
        for group in &mesh.groups {
            let centre = &mesh.triangles[group.start + group.count / 2];
            let n = centre.calculate_normal();
            let outward = centre.vertices[0].normal;
            assert!(n.dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_sharp_box_when_radius_zero() {
        let mesh = RoundedBox::new(2.0, 2.0, 2.0, 1, 0.0).build();
        // One flat cell per face
        assert_eq!(mesh.triangles.len(), 12);
    }

    #[test]
    fn test_plane() {
        let mesh = Mesh::plane(10.0, 10.0);
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.interleaved().len(), 2 * 3 * 8);
        assert!((mesh.triangles[0].calculate_normal() - Vector3::z()).norm() < 1e-6);
    }
}
