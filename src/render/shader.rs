pub(crate) const SHADER: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    time: f32,
    timeline: f32,
    start_index: f32,
    end_index: f32,
}

struct PlaneUniform {
    model: mat4x4<f32>,
    size: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(1) @binding(0)
var<uniform> plane: PlaneUniform;

@group(2) @binding(0) var image1: texture_2d<f32>;
@group(2) @binding(1) var image2: texture_2d<f32>;
@group(2) @binding(2) var image3: texture_2d<f32>;
@group(2) @binding(3) var image4: texture_2d<f32>;
@group(2) @binding(4) var image_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = frame.view_proj * plane.model * vec4<f32>(input.position, 1.0);
    out.uv = input.uv;
    return out;
}

fn sample_slot(index: f32, uv: vec2<f32>) -> vec4<f32> {
    var colors = array<vec4<f32>, 4>(
        textureSample(image1, image_sampler, uv),
        textureSample(image2, image_sampler, uv),
        textureSample(image3, image_sampler, uv),
        textureSample(image4, image_sampler, uv),
    );
    let slot = u32(clamp(index, 0.0, 3.0));
    return colors[slot];
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    // Timeline overshoots to 3.0; everything past 1.0 is the settled image.
    let progress = smoothstep(0.0, 1.0, clamp(frame.timeline, 0.0, 1.0));
    let wave = sin(input.uv.y * 12.0 + frame.time) * 0.03 * progress * (1.0 - progress) * 4.0;

    let from_uv = clamp(input.uv + vec2<f32>(wave * progress, 0.0), vec2<f32>(0.0), vec2<f32>(1.0));
    let to_uv = clamp(input.uv - vec2<f32>(wave * (1.0 - progress), 0.0), vec2<f32>(0.0), vec2<f32>(1.0));

    let from_color = sample_slot(frame.start_index, from_uv);
    let to_color = sample_slot(frame.end_index, to_uv);
    return mix(from_color, to_color, progress);
}
"#;
