/// WebGL2 renderer for the cube scene
///
/// Each frame runs three passes: cube depth from the shadow-casting light,
/// the shaded cube, then the shadow-only plane blended over the cleared
/// (transparent) canvas.
use scrollcube_core::{
    Camera, CanvasConfig, CubeMaterials, FaceGroup, FaceTexture, FrameState, HdrImage, Mesh, RoundedBox,
    StandardMaterial,
};
use web_sys::{HtmlImageElement, WebGl2RenderingContext as Gl, WebGlFramebuffer, WebGlTexture};

use crate::gl::{bind_texture_unit, create_texture, js_err, MeshBuffer, Program};
use crate::shaders;

const ENV_UNIT: u32 = 0;
const MAP_UNIT: u32 = 1;
const SHADOW_UNIT: u32 = 2;

const SHADOW_PLANE_SIZE: f32 = 10.0;

const CUBE_UNIFORMS: &[&str] = &[
    "u_model",
    "u_view_proj",
    "u_normal_matrix",
    "u_view_dir",
    "u_key_dir",
    "u_key_radiance",
    "u_orbit_dir",
    "u_orbit_radiance",
    "u_color",
    "u_emissive",
    "u_emissive_intensity",
    "u_roughness",
    "u_metalness",
    "u_env_intensity",
    "u_has_map",
    "u_map",
    "u_has_env",
    "u_env",
    "u_exposure",
];

const PLANE_UNIFORMS: &[&str] = &[
    "u_model",
    "u_view_proj",
    "u_light_view_proj",
    "u_shadow_map",
    "u_texel",
    "u_opacity",
];

const DEPTH_UNIFORMS: &[&str] = &["u_model", "u_light_view_proj"];

struct ShadowTarget {
    framebuffer: WebGlFramebuffer,
    depth: WebGlTexture,
    size: i32,
}

impl ShadowTarget {
    fn new(gl: &Gl, size: i32) -> Result<Self, String> {
        let depth = create_texture(gl, Gl::NEAREST, Gl::NEAREST, Gl::CLAMP_TO_EDGE, Gl::CLAMP_TO_EDGE)?;
        gl.tex_storage_2d(Gl::TEXTURE_2D, 1, Gl::DEPTH_COMPONENT24, size, size);

        let framebuffer = gl.create_framebuffer().ok_or("Unable to create shadow framebuffer")?;
        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&framebuffer));
        gl.framebuffer_texture_2d(Gl::FRAMEBUFFER, Gl::DEPTH_ATTACHMENT, Gl::TEXTURE_2D, Some(&depth), 0);
        let status = gl.check_framebuffer_status(Gl::FRAMEBUFFER);
        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        gl.bind_texture(Gl::TEXTURE_2D, None);

        if status != Gl::FRAMEBUFFER_COMPLETE {
            return Err(format!("Shadow framebuffer incomplete: 0x{:x}", status));
        }
        Ok(Self { framebuffer, depth, size })
    }
}

pub struct Renderer {
    gl: Gl,
    cube_program: Program,
    plane_program: Program,
    depth_program: Program,
    cube: MeshBuffer,
    groups: Vec<FaceGroup>,
    plane: MeshBuffer,
    materials: CubeMaterials,
    environment: Option<WebGlTexture>,
    faces: [Option<WebGlTexture>; 3],
    shadow: ShadowTarget,
    camera: Camera,
    exposure: f32,
    size: i32,
}

impl Renderer {
    pub fn new(gl: Gl, canvas: &CanvasConfig, buffer_size: u32) -> Result<Self, String> {
        let cube_program = Program::new(&gl, shaders::CUBE_VERTEX, shaders::CUBE_FRAGMENT, CUBE_UNIFORMS)?;
        let plane_program = Program::new(&gl, shaders::PLANE_VERTEX, shaders::PLANE_FRAGMENT, PLANE_UNIFORMS)?;
        let depth_program = Program::new(&gl, shaders::DEPTH_VERTEX, shaders::DEPTH_FRAGMENT, DEPTH_UNIFORMS)?;

        let cube_mesh = RoundedBox::cube().build();
        let cube = MeshBuffer::new(&gl, &cube_mesh.interleaved())?;
        let plane = MeshBuffer::new(&gl, &Mesh::plane(SHADOW_PLANE_SIZE, SHADOW_PLANE_SIZE).interleaved())?;
        log::debug!(
            "cube mesh: {} triangles in {} groups",
            cube_mesh.triangles.len(),
            cube_mesh.groups.len()
        );

        let shadow = ShadowTarget::new(&gl, canvas.shadow_map_size as i32)?;

        Ok(Self {
            gl,
            cube_program,
            plane_program,
            depth_program,
            cube,
            groups: cube_mesh.groups,
            plane,
            materials: CubeMaterials::default(),
            environment: None,
            faces: [None, None, None],
            shadow,
            camera: Camera::scene(),
            exposure: canvas.exposure,
            size: buffer_size as i32,
        })
    }

    pub fn resize(&mut self, buffer_size: u32) {
        self.size = buffer_size as i32;
    }

    /// Upload the decoded environment map as raw RGBE texels
    pub fn upload_environment(&mut self, image: &HdrImage) -> Result<(), String> {
        let gl = &self.gl;
        let texture = create_texture(gl, Gl::NEAREST, Gl::NEAREST, Gl::REPEAT, Gl::CLAMP_TO_EDGE)?;
        gl.pixel_storei(Gl::UNPACK_FLIP_Y_WEBGL, 0);
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA8 as i32,
            image.width() as i32,
            image.height() as i32,
            0,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            Some(image.rgbe()),
        )
        .map_err(js_err)?;
        gl.bind_texture(Gl::TEXTURE_2D, None);

        self.environment = Some(texture);
        Ok(())
    }

    /// Upload one face image; faces without a texture render untextured
    pub fn upload_face(&mut self, face: FaceTexture, image: &HtmlImageElement) -> Result<(), String> {
        let gl = &self.gl;
        let texture = create_texture(gl, Gl::LINEAR_MIPMAP_LINEAR, Gl::LINEAR, Gl::REPEAT, Gl::REPEAT)?;
        gl.pixel_storei(Gl::UNPACK_FLIP_Y_WEBGL, 1);
        let upload = gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
            Gl::TEXTURE_2D,
            0,
            Gl::SRGB8_ALPHA8 as i32,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            image,
        );
        gl.pixel_storei(Gl::UNPACK_FLIP_Y_WEBGL, 0);
        upload.map_err(js_err)?;
        gl.generate_mipmap(Gl::TEXTURE_2D);
        gl.bind_texture(Gl::TEXTURE_2D, None);

        self.faces[face.index()] = Some(texture);
        Ok(())
    }

    pub fn render(&self, frame: &FrameState) {
        let shadow_camera = Camera::shadow(frame.lights.key.position, frame.lights.key.target);
        let light_view_proj = shadow_camera.view_projection();

        self.depth_pass(frame, &light_view_proj);
        self.cube_pass(frame);
        self.plane_pass(frame, &light_view_proj);
    }

    fn depth_pass(&self, frame: &FrameState, light_view_proj: &nalgebra::Matrix4<f32>) {
        let gl = &self.gl;
        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&self.shadow.framebuffer));
        gl.viewport(0, 0, self.shadow.size, self.shadow.size);
        gl.enable(Gl::DEPTH_TEST);
        gl.depth_mask(true);
        gl.disable(Gl::BLEND);
        gl.clear(Gl::DEPTH_BUFFER_BIT);

        self.depth_program.bind(gl);
        self.depth_program.set_mat4(gl, "u_model", &frame.cube_model);
        self.depth_program.set_mat4(gl, "u_light_view_proj", light_view_proj);
        self.cube.bind(gl);
        gl.draw_arrays(Gl::TRIANGLES, 0, self.cube.vertex_count);

        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
    }

    fn cube_pass(&self, frame: &FrameState) {
        let gl = &self.gl;
        gl.viewport(0, 0, self.size, self.size);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        gl.enable(Gl::CULL_FACE);
        gl.cull_face(Gl::BACK);

        let program = &self.cube_program;
        program.bind(gl);
        program.set_mat4(gl, "u_model", &frame.cube_model);
        program.set_mat4(gl, "u_view_proj", &self.camera.view_projection());
        program.set_mat3(gl, "u_normal_matrix", &frame.cube_transform.normal_matrix());
        program.set_vec3(gl, "u_view_dir", &-self.camera.forward());
        program.set_vec3(gl, "u_key_dir", &frame.lights.key.direction());
        program.set_rgb(gl, "u_key_radiance", frame.lights.key.radiance());
        program.set_vec3(gl, "u_orbit_dir", &frame.lights.orbit.direction());
        program.set_rgb(gl, "u_orbit_radiance", frame.lights.orbit.radiance());
        program.set_f32(gl, "u_exposure", self.exposure);

        program.set_i32(gl, "u_env", ENV_UNIT as i32);
        program.set_i32(gl, "u_map", MAP_UNIT as i32);
        program.set_bool(gl, "u_has_env", self.environment.is_some());
        bind_texture_unit(gl, ENV_UNIT, self.environment.as_ref());

        self.cube.bind(gl);
        for group in &self.groups {
            let Some(material) = self.materials.for_group(group.material) else {
                continue;
            };
            self.set_material(material);
            gl.draw_arrays(Gl::TRIANGLES, (group.start * 3) as i32, (group.count * 3) as i32);
        }

        gl.disable(Gl::CULL_FACE);
    }

    fn set_material(&self, material: &StandardMaterial) {
        let gl = &self.gl;
        let program = &self.cube_program;
        program.set_rgb(gl, "u_color", material.color);
        program.set_rgb(gl, "u_emissive", material.emissive);
        program.set_f32(gl, "u_emissive_intensity", material.emissive_intensity);
        program.set_f32(gl, "u_roughness", material.roughness);
        program.set_f32(gl, "u_metalness", material.metalness);
        program.set_f32(gl, "u_env_intensity", material.env_map_intensity);

        let map = material.map.and_then(|face| self.faces[face.index()].as_ref());
        program.set_bool(gl, "u_has_map", map.is_some());
        bind_texture_unit(gl, MAP_UNIT, map);
    }

    fn plane_pass(&self, frame: &FrameState, light_view_proj: &nalgebra::Matrix4<f32>) {
        if frame.shadow_opacity <= 0.0 {
            return;
        }
        let gl = &self.gl;
        gl.enable(Gl::BLEND);
        gl.blend_func(Gl::ONE, Gl::ONE_MINUS_SRC_ALPHA);
        gl.depth_mask(false);

        let program = &self.plane_program;
        program.bind(gl);
        program.set_mat4(gl, "u_model", &frame.plane_model);
        program.set_mat4(gl, "u_view_proj", &self.camera.view_projection());
        program.set_mat4(gl, "u_light_view_proj", light_view_proj);
        program.set_i32(gl, "u_shadow_map", SHADOW_UNIT as i32);
        program.set_f32(gl, "u_texel", 1.0 / self.shadow.size as f32);
        program.set_f32(gl, "u_opacity", frame.shadow_opacity);
        bind_texture_unit(gl, SHADOW_UNIT, Some(&self.shadow.depth));

        self.plane.bind(gl);
        gl.draw_arrays(Gl::TRIANGLES, 0, self.plane.vertex_count);

        bind_texture_unit(gl, SHADOW_UNIT, None);
        gl.bind_vertex_array(None);
        gl.depth_mask(true);
        gl.disable(Gl::BLEND);
    }
}
