/// Thin helpers over the WebGL2 context
use std::collections::HashMap;

use js_sys::Float32Array;
use nalgebra::{Matrix3, Matrix4, Vector3};
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

/// Floats per interleaved vertex: position, normal, uv
const VERTEX_FLOATS: i32 = 8;

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, String> {
    let shader = gl.create_shader(kind).ok_or("Unable to create shader object")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(format!("Shader compile failed: {}", log))
    }
}

/// A linked program with its uniform locations looked up once
pub struct Program {
    program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
}

impl Program {
    pub fn new(gl: &Gl, vertex: &str, fragment: &str, uniforms: &[&'static str]) -> Result<Self, String> {
        let vs = compile_shader(gl, Gl::VERTEX_SHADER, vertex)?;
        let fs = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment)?;

        let program = gl.create_program().ok_or("Unable to create program object")?;
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        gl.link_program(&program);
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        if !gl.get_program_parameter(&program, Gl::LINK_STATUS).as_bool().unwrap_or(false) {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            return Err(format!("Program link failed: {}", log));
        }

        // Uniforms the compiler optimised away simply stay unset
        let uniforms = uniforms
            .iter()
            .filter_map(|&name| gl.get_uniform_location(&program, name).map(|loc| (name, loc)))
            .collect();

        Ok(Self { program, uniforms })
    }

    pub fn bind(&self, gl: &Gl) {
        gl.use_program(Some(&self.program));
    }

    fn location(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }

    pub fn set_mat4(&self, gl: &Gl, name: &str, value: &Matrix4<f32>) {
        gl.uniform_matrix4fv_with_f32_array(self.location(name), false, value.as_slice());
    }

    pub fn set_mat3(&self, gl: &Gl, name: &str, value: &Matrix3<f32>) {
        gl.uniform_matrix3fv_with_f32_array(self.location(name), false, value.as_slice());
    }

    pub fn set_vec3(&self, gl: &Gl, name: &str, value: &Vector3<f32>) {
        gl.uniform3f(self.location(name), value.x, value.y, value.z);
    }

    pub fn set_rgb(&self, gl: &Gl, name: &str, value: [f32; 3]) {
        gl.uniform3f(self.location(name), value[0], value[1], value[2]);
    }

    pub fn set_f32(&self, gl: &Gl, name: &str, value: f32) {
        gl.uniform1f(self.location(name), value);
    }

    pub fn set_i32(&self, gl: &Gl, name: &str, value: i32) {
        gl.uniform1i(self.location(name), value);
    }

    pub fn set_bool(&self, gl: &Gl, name: &str, value: bool) {
        self.set_i32(gl, name, value as i32);
    }
}

/// Vertex array holding one interleaved `Mesh::interleaved` buffer
pub struct MeshBuffer {
    vao: WebGlVertexArrayObject,
    _buffer: WebGlBuffer,
    pub vertex_count: i32,
}

impl MeshBuffer {
    pub fn new(gl: &Gl, interleaved: &[f32]) -> Result<Self, String> {
        let vao = gl.create_vertex_array().ok_or("Unable to create vertex array")?;
        let buffer = gl.create_buffer().ok_or("Unable to create vertex buffer")?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        let data = Float32Array::from(interleaved);
        gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &data, Gl::STATIC_DRAW);

        let stride = VERTEX_FLOATS * 4;
        // Locations match the `layout(location = n)` declarations in the shaders
        for (location, size, offset) in [(0u32, 3, 0), (1, 3, 3), (2, 2, 6)] {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, size, Gl::FLOAT, false, stride, offset * 4);
        }

        gl.bind_vertex_array(None);
        gl.bind_buffer(Gl::ARRAY_BUFFER, None);

        Ok(Self {
            vao,
            _buffer: buffer,
            vertex_count: interleaved.len() as i32 / VERTEX_FLOATS,
        })
    }

    pub fn bind(&self, gl: &Gl) {
        gl.bind_vertex_array(Some(&self.vao));
    }
}

/// Create a 2D texture and apply filtering and wrapping
pub fn create_texture(gl: &Gl, min_filter: u32, mag_filter: u32, wrap_s: u32, wrap_t: u32) -> Result<WebGlTexture, String> {
    let texture = gl.create_texture().ok_or("Unable to create texture")?;
    gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, min_filter as i32);
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, mag_filter as i32);
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, wrap_s as i32);
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, wrap_t as i32);
    Ok(texture)
}

/// Bind `texture` (or nothing) to texture unit `unit`
pub fn bind_texture_unit(gl: &Gl, unit: u32, texture: Option<&WebGlTexture>) {
    gl.active_texture(Gl::TEXTURE0 + unit);
    gl.bind_texture(Gl::TEXTURE_2D, texture);
}

pub fn js_err(e: wasm_bindgen::JsValue) -> String {
    format!("{:?}", e)
}
