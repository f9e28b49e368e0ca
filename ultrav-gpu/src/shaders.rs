//! WGSL sources

/// Lit mesh shader: one directional light, ambient term, an environment
/// tint for reflections and a simple metal/roughness specular lobe.
pub const MESH_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    environment: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    // x: roughness, y: metalness, z: unlit flag, w: exposure
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(1) @binding(0) var<uniform> object: Object;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = object.model * vec4<f32>(in.position, 1.0);
    out.world_pos = world.xyz;
    out.normal = (object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.clip_position = frame.view_proj * world;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = object.color.rgb;
    if (object.params.z > 0.5) {
        return vec4<f32>(base, 1.0);
    }

    let roughness = clamp(object.params.x, 0.04, 1.0);
    let metalness = clamp(object.params.y, 0.0, 1.0);

    let n = normalize(in.normal);
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    let l = normalize(-frame.light_dir.xyz);
    let h = normalize(l + v);

    let n_dot_l = max(dot(n, l), 0.0);
    let shininess = mix(256.0, 4.0, roughness);
    let specular = pow(max(dot(n, h), 0.0), shininess) * (1.0 - roughness * 0.75);

    let f0 = mix(vec3<f32>(0.04), base, metalness);
    let diffuse = base * (1.0 - metalness);

    var color = frame.ambient.rgb * diffuse;
    color += frame.environment.rgb * (f0 + diffuse * 0.25);
    color += frame.light_color.rgb * (diffuse * n_dot_l + f0 * specular * n_dot_l);

    let exposed = color * object.params.w;
    return vec4<f32>(exposed / (exposed + vec3<f32>(1.0)), 1.0);
}
"#;
