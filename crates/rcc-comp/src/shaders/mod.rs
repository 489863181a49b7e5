//! WGSL shader sources for the mask compute pipelines.
//! These are used by the wgpu backend when the `wgpu` feature is enabled.

#![allow(dead_code)] // Shaders used by wgpu backend

/// Even-odd polygon fill, one thread per mask texel.
///
/// `points` holds pixel-space polygon vertices for all shapes back to
/// back; `ranges[i] = (first_vertex, vertex_count)` delimits shape `i`.
/// Parity per shape, union across shapes.
pub const MASK_EVEN_ODD: &str = r#"
@group(0) @binding(0) var<storage, read> points: array<vec2<f32>>;
@group(0) @binding(1) var<storage, read> ranges: array<vec2<u32>>;
@group(0) @binding(2) var<storage, read_write> mask: array<f32>;
@group(0) @binding(3) var<uniform> dims: vec4<u32>;  // w, h, shape_count, 0

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if id.x >= dims.x || id.y >= dims.y { return; }

    let px = f32(id.x) + 0.5;
    let py = f32(id.y) + 0.5;

    var covered = false;
    for (var s = 0u; s < dims.z; s++) {
        let first = ranges[s].x;
        let count = ranges[s].y;
        var inside = false;
        for (var i = 0u; i < count; i++) {
            let a = points[first + i];
            let b = points[first + ((i + 1u) % count)];
            if (a.y <= py) != (b.y <= py) {
                let x = a.x + (py - a.y) * (b.x - a.x) / (b.y - a.y);
                if x > px { inside = !inside; }
            }
        }
        covered = covered || inside;
    }

    mask[id.y * dims.x + id.x] = select(0.0, 1.0, covered);
}
"#;

/// One blur pass along a single axis.
///
/// Tap weights are smoothstep(1 - |i|/r); the weighted sum is divided
/// by r to match the CPU path. Mirrored-repeat addressing with linear
/// interpolation between texels.
pub const BLUR_PASS: &str = r#"
struct BlurParams {
    width: u32,
    height: u32,
    radius: u32,
    axis: u32,       // 0 = horizontal, 1 = vertical
    step_px: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
}

@group(0) @binding(0) var<storage, read> src: array<f32>;
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<uniform> params: BlurParams;

fn mirror(i: i32, len: i32) -> i32 {
    let period = 2 * len;
    var m = ((i % period) + period) % period;
    if m >= len { m = period - 1 - m; }
    return m;
}

fn sample_line(x: u32, y: u32, t: f32) -> f32 {
    var len: i32;
    if params.axis == 0u { len = i32(params.width); } else { len = i32(params.height); }

    let lo = i32(floor(t));
    let frac = t - floor(t);
    let i0 = u32(mirror(lo, len));
    let i1 = u32(mirror(lo + 1, len));

    var a: f32;
    var b: f32;
    if params.axis == 0u {
        a = src[y * params.width + i0];
        b = src[y * params.width + i1];
    } else {
        a = src[i0 * params.width + x];
        b = src[i1 * params.width + x];
    }
    return a + (b - a) * frac;
}

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if id.x >= params.width || id.y >= params.height { return; }

    let r = i32(params.radius);
    var center: f32;
    if params.axis == 0u { center = f32(id.x); } else { center = f32(id.y); }

    var acc = 0.0;
    for (var i = -r; i <= r; i++) {
        let w = smoothstep(0.0, 1.0, 1.0 - abs(f32(i)) / f32(r));
        acc += w * sample_line(id.x, id.y, center + f32(i) * params.step_px);
    }

    dst[id.y * params.width + id.x] = acc / f32(r);
}
"#;
