//! engine-shaders: WGSL shader sources and the uniform layouts they expect.

/// Per-frame camera data shared by every pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of `proj * view` with the view translation removed; sky-box only.
    pub inv_sky_view_proj: [[f32; 4]; 4],
    /// xyz = camera world position, w unused.
    pub camera_pos: [f32; 4],
}

/// Standard material parameters.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear base color, a unused.
    pub color: [f32; 4],
    /// x = metalness, y = roughness, z = 1 when the env map is loaded, w unused.
    pub params: [f32; 4],
}

/// Per-instance model matrix, column major.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

/// Cube-map lookups mirror X: faces are authored for the left-handed
/// cube-map convention while the scene is right-handed.
pub const CUBE_LOOKUP_WGSL: &str = r#"
fn cube_dir(d: vec3<f32>) -> vec3<f32> {
    return vec3<f32>(-d.x, d.y, d.z);
}
"#;

/// Sky-box: fullscreen triangle at the far plane sampling the background cube.
pub const SKYBOX_WGSL: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    inv_sky_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var sky_tex: texture_cube<f32>;
@group(1) @binding(1) var sky_smp: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VsOut {
    var pos = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 3.0, -1.0),
        vec2<f32>(-1.0,  3.0),
    );
    var out: VsOut;
    // z = w so the triangle sits on the far plane and loses every depth test.
    out.pos = vec4<f32>(pos[vi], 1.0, 1.0);
    out.ndc = pos[vi];
    return out;
}

@fragment
fn fs_main(inp: VsOut) -> @location(0) vec4<f32> {
    let world = globals.inv_sky_view_proj * vec4<f32>(inp.ndc, 1.0, 1.0);
    let dir = normalize(world.xyz / world.w);
    return vec4<f32>(textureSample(sky_tex, sky_smp, cube_dir(dir)).rgb, 1.0);
}
"#;

/// Metallic-roughness material lit only by its environment cube map.
/// Vertex buffer 0: position/normal; buffer 1: per-instance model matrix.
pub const STANDARD_WGSL: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    inv_sky_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct Material {
    color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var<uniform> material: Material;
@group(1) @binding(1) var env_tex: texture_cube<f32>;
@group(1) @binding(2) var env_smp: sampler;

struct VsIn {
    @location(0) pos: vec3<f32>,
    @location(1) nrm: vec3<f32>,
    @location(2) m0: vec4<f32>,
    @location(3) m1: vec4<f32>,
    @location(4) m2: vec4<f32>,
    @location(5) m3: vec4<f32>,
};

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_nrm: vec3<f32>,
};

@vertex
fn vs_main(inp: VsIn) -> VsOut {
    let model = mat4x4<f32>(inp.m0, inp.m1, inp.m2, inp.m3);
    let world = model * vec4<f32>(inp.pos, 1.0);
    var out: VsOut;
    out.pos = globals.view_proj * world;
    out.world_pos = world.xyz;
    // Instances are uniformly scaled, so the model matrix is safe for normals.
    out.world_nrm = (model * vec4<f32>(inp.nrm, 0.0)).xyz;
    return out;
}

// Analytic split-sum environment BRDF (Karis, "Physically Based Shading on Mobile").
fn env_brdf_approx(f0: vec3<f32>, roughness: f32, n_dot_v: f32) -> vec3<f32> {
    let c0 = vec4<f32>(-1.0, -0.0275, -0.572, 0.022);
    let c1 = vec4<f32>(1.0, 0.0425, 1.04, -0.04);
    let r = roughness * c0 + c1;
    let a004 = min(r.x * r.x, exp2(-9.28 * n_dot_v)) * r.x + r.y;
    let ab = vec2<f32>(-1.04, 1.04) * a004 + r.zw;
    return f0 * ab.x + ab.y;
}

@fragment
fn fs_main(inp: VsOut) -> @location(0) vec4<f32> {
    let metalness = material.params.x;
    let roughness = material.params.y;
    let env_loaded = material.params.z;

    let n = normalize(inp.world_nrm);
    let v = normalize(globals.camera_pos.xyz - inp.world_pos);
    let r = reflect(-v, n);
    let n_dot_v = clamp(dot(n, v), 0.0, 1.0);

    let env = textureSample(env_tex, env_smp, cube_dir(r)).rgb * env_loaded;
    let f0 = mix(vec3<f32>(0.04), material.color.rgb, metalness);
    let specular = env * env_brdf_approx(f0, roughness, n_dot_v);
    return vec4<f32>(specular, 1.0);
}
"#;

/// Prepend shared helpers to a shader body.
pub fn with_cube_lookup(body: &str) -> String {
    format!("{CUBE_LOOKUP_WGSL}\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 64);
    }

    #[test]
    fn shaders_declare_entry_points() {
        for src in [SKYBOX_WGSL, STANDARD_WGSL] {
            assert!(src.contains("fn vs_main"));
            assert!(src.contains("fn fs_main"));
            assert!(src.contains("cube_dir("));
        }
        assert!(with_cube_lookup(SKYBOX_WGSL).starts_with("\nfn cube_dir"));
    }
}
