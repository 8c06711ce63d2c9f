pub(crate) const SHADER: &str = r#"
struct GlobalUniform {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    camera_position: vec4<f32>,
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) view_depth: f32,
    @location(3) lit: f32,
}

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    let world_position = model * vec4<f32>(vertex.position, 1.0);
    let view_position = globals.view * world_position;

    var out: VertexOutput;
    out.position = globals.view_proj * world_position;
    // cells are scaled uniformly, so the model matrix transforms normals too
    out.normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    out.view_depth = -view_position.z;
    out.lit = instance.params.x;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    var color = input.color.rgb;
    if (input.lit > 0.5) {
        let weight = 0.5 * normalize(input.normal).y + 0.5;
        let irradiance = mix(globals.ground_color.rgb, globals.sky_color.rgb, weight);
        color = color * irradiance * globals.sky_color.w;
    }
    let fog = smoothstep(globals.fog_range.x, globals.fog_range.y, input.view_depth);
    return vec4<f32>(mix(color, globals.fog_color.rgb, fog), input.color.a);
}
"#;
