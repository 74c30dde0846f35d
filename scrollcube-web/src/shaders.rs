/// GLSL ES 3.00 sources

/// Depth-only pass from the shadow-casting light
pub const DEPTH_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;

uniform mat4 u_model;
uniform mat4 u_light_view_proj;

void main() {
    gl_Position = u_light_view_proj * u_model * vec4(a_position, 1.0);
}
"#;

pub const DEPTH_FRAGMENT: &str = r#"#version 300 es
precision mediump float;

void main() {}
"#;

pub const CUBE_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

uniform mat4 u_model;
uniform mat4 u_view_proj;
uniform mat3 u_normal_matrix;

out vec3 v_normal;
out vec2 v_uv;

void main() {
    v_normal = u_normal_matrix * a_normal;
    v_uv = a_uv;
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
}
"#;

/// Metal/rough shading with an equirectangular RGBE environment,
/// ACES filmic tone mapping and sRGB output
pub const CUBE_FRAGMENT: &str = r#"#version 300 es
precision highp float;

in vec3 v_normal;
in vec2 v_uv;

uniform vec3 u_view_dir;
uniform vec3 u_key_dir;
uniform vec3 u_key_radiance;
uniform vec3 u_orbit_dir;
uniform vec3 u_orbit_radiance;

uniform vec3 u_color;
uniform vec3 u_emissive;
uniform float u_emissive_intensity;
uniform float u_roughness;
uniform float u_metalness;
uniform float u_env_intensity;

uniform bool u_has_map;
uniform sampler2D u_map;
uniform bool u_has_env;
uniform sampler2D u_env;
uniform float u_exposure;

out vec4 frag_color;

const float PI = 3.141592653589793;

vec3 decode_rgbe(vec4 rgbe) {
    if (rgbe.a == 0.0) {
        return vec3(0.0);
    }
    return rgbe.rgb * 255.0 * exp2(rgbe.a * 255.0 - 136.0);
}

vec2 equirect_uv(vec3 dir) {
    float u = atan(dir.z, dir.x) * (0.5 / PI) + 0.5;
    float v = asin(clamp(dir.y, -1.0, 1.0)) / PI + 0.5;
    // Radiance rows run top to bottom
    return vec2(u, 1.0 - v);
}

vec3 sample_env(vec3 dir) {
    return decode_rgbe(textureLod(u_env, equirect_uv(dir), 0.0));
}

vec3 env_irradiance(vec3 n) {
    vec3 t = normalize(abs(n.y) < 0.99 ? cross(n, vec3(0.0, 1.0, 0.0)) : cross(n, vec3(1.0, 0.0, 0.0)));
    vec3 b = cross(n, t);
    vec3 sum = sample_env(n);
    sum += sample_env(normalize(n + 0.8 * t));
    sum += sample_env(normalize(n - 0.8 * t));
    sum += sample_env(normalize(n + 0.8 * b));
    sum += sample_env(normalize(n - 0.8 * b));
    return sum / 5.0;
}

float d_ggx(float n_dot_h, float a) {
    float a2 = a * a;
    float d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

float v_smith(float n_dot_l, float n_dot_v, float a) {
    float a2 = a * a;
    float gv = n_dot_l * sqrt(n_dot_v * n_dot_v * (1.0 - a2) + a2);
    float gl = n_dot_v * sqrt(n_dot_l * n_dot_l * (1.0 - a2) + a2);
    return 0.5 / max(gv + gl, 1e-5);
}

vec3 f_schlick(vec3 f0, float v_dot_h) {
    return f0 + (1.0 - f0) * pow(1.0 - v_dot_h, 5.0);
}

vec3 direct(vec3 n, vec3 v, vec3 l, vec3 radiance, vec3 diffuse, vec3 f0, float a) {
    float n_dot_l = clamp(dot(n, l), 0.0, 1.0);
    if (n_dot_l <= 0.0) {
        return vec3(0.0);
    }
    vec3 h = normalize(l + v);
    float n_dot_v = clamp(dot(n, v), 1e-4, 1.0);
    float n_dot_h = clamp(dot(n, h), 0.0, 1.0);
    float v_dot_h = clamp(dot(v, h), 0.0, 1.0);
    vec3 specular = f_schlick(f0, v_dot_h) * d_ggx(n_dot_h, a) * v_smith(n_dot_l, n_dot_v, a);
    return radiance * n_dot_l * (diffuse + PI * specular);
}

vec3 env_brdf_approx(vec3 f0, float roughness, float n_dot_v) {
    const vec4 c0 = vec4(-1.0, -0.0275, -0.572, 0.022);
    const vec4 c1 = vec4(1.0, 0.0425, 1.04, -0.04);
    vec4 r = roughness * c0 + c1;
    float a004 = min(r.x * r.x, exp2(-9.28 * n_dot_v)) * r.x + r.y;
    vec2 ab = vec2(-1.04, 1.04) * a004 + r.zw;
    return f0 * ab.x + ab.y;
}

vec3 rrt_and_odt_fit(vec3 v) {
    vec3 a = v * (v + 0.0245786) - 0.000090537;
    vec3 b = v * (0.983729 * v + 0.4329510) + 0.238081;
    return a / b;
}

vec3 aces_filmic(vec3 color) {
    const mat3 input_mat = mat3(
        vec3(0.59719, 0.07600, 0.02840),
        vec3(0.35458, 0.90834, 0.13383),
        vec3(0.04823, 0.01566, 0.83777)
    );
    const mat3 output_mat = mat3(
        vec3(1.60475, -0.10208, -0.00327),
        vec3(-0.53108, 1.10813, -0.07276),
        vec3(-0.07367, -0.00605, 1.07602)
    );
    color *= 1.0 / 0.6;
    color = output_mat * rrt_and_odt_fit(input_mat * color);
    return clamp(color, 0.0, 1.0);
}

vec3 linear_to_srgb(vec3 c) {
    vec3 lo = c * 12.92;
    vec3 hi = pow(c, vec3(1.0 / 2.4)) * 1.055 - 0.055;
    return mix(hi, lo, vec3(lessThanEqual(c, vec3(0.0031308))));
}

void main() {
    vec3 n = normalize(v_normal);
    if (!gl_FrontFacing) {
        n = -n;
    }
    vec3 v = normalize(u_view_dir);

    vec3 texel = u_has_map ? texture(u_map, v_uv).rgb : vec3(1.0);
    vec3 base = u_color * texel;
    vec3 diffuse = base * (1.0 - u_metalness);
    vec3 f0 = mix(vec3(0.04), base, u_metalness);
    float roughness = max(u_roughness, 0.045);
    float a = roughness * roughness;

    vec3 color = direct(n, v, -u_key_dir, u_key_radiance, diffuse, f0, a);
    color += direct(n, v, -u_orbit_dir, u_orbit_radiance, diffuse, f0, a);

    if (u_has_env) {
        float n_dot_v = clamp(dot(n, v), 0.0, 1.0);
        vec3 r = reflect(-v, n);
        color += diffuse * env_irradiance(n) * u_env_intensity;
        color += sample_env(r) * env_brdf_approx(f0, roughness, n_dot_v) * u_env_intensity;
    }

    // The face image doubles as the emissive map
    color += u_emissive * u_emissive_intensity * texel;

    frag_color = vec4(linear_to_srgb(aces_filmic(color * u_exposure)), 1.0);
}
"#;

pub const PLANE_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;

uniform mat4 u_model;
uniform mat4 u_view_proj;
uniform mat4 u_light_view_proj;

out vec4 v_light_pos;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_light_pos = u_light_view_proj * world;
    gl_Position = u_view_proj * world;
}
"#;

/// Shadow-only surface: black, with alpha from a 3x3 PCF lookup
pub const PLANE_FRAGMENT: &str = r#"#version 300 es
precision highp float;

in vec4 v_light_pos;

uniform highp sampler2D u_shadow_map;
uniform float u_texel;
uniform float u_opacity;

out vec4 frag_color;

float shadow_amount() {
    vec3 p = v_light_pos.xyz / v_light_pos.w * 0.5 + 0.5;
    if (any(lessThan(p, vec3(0.0))) || any(greaterThan(p, vec3(1.0)))) {
        return 0.0;
    }
    float shadow = 0.0;
    for (int x = -1; x <= 1; x++) {
        for (int y = -1; y <= 1; y++) {
            float depth = texture(u_shadow_map, p.xy + vec2(float(x), float(y)) * u_texel).r;
            shadow += p.z - 0.002 > depth ? 1.0 : 0.0;
        }
    }
    return shadow / 9.0;
}

void main() {
    // Premultiplied: color stays zero
    frag_color = vec4(0.0, 0.0, 0.0, u_opacity * shadow_amount());
}
"#;
