//! Color math shared by the bloom pipeline and the tone mappers.
//!
//! Colors are `[f64; 3]` RGB triples in [0, 1] while in displayable range;
//! components may transiently exceed 1.0 (HDR) after bloom compositing and
//! before tone mapping.

/// Relative luminance coefficients, see
/// <https://en.wikipedia.org/wiki/Relative_luminance>
const LUM_COEF: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Luminances below this are treated as black when rescaling.
const LUM_EPSILON: f64 = 0.001;

/// Convert a single 8-bit color component to float range [0, 1]
pub fn component_to_float(component: u8) -> f64 {
    component as f64 / 255.0
}

/// Convert an 8-bit RGB triple to float range [0, 1]
pub fn color_to_float(color: [u8; 3]) -> [f64; 3] {
    [
        component_to_float(color[0]),
        component_to_float(color[1]),
        component_to_float(color[2]),
    ]
}

/// True if `a` and `b` differ by less than `delta`
pub fn within_eps(a: f64, b: f64, delta: f64) -> bool {
    (a - b).abs() < delta
}

/// True if every RGB component of `a` is within `delta` of `b`'s
pub fn colors_match(a: [f64; 3], b: [f64; 3], delta: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| within_eps(*x, *y, delta))
}

/// Relative luminance of an RGB color
pub fn luminance(color: [f64; 3]) -> f64 {
    color[0] * LUM_COEF[0] + color[1] * LUM_COEF[1] + color[2] * LUM_COEF[2]
}

/// Clamp every component of a (possibly HDR) color to at most 1.0
pub fn clamp_color(color: [f64; 3]) -> [f64; 3] {
    [color[0].min(1.0), color[1].min(1.0), color[2].min(1.0)]
}

/// Rescale a color so its luminance becomes `new_lum`.
///
/// Near-black colors carry no usable hue, so they are returned unchanged
/// instead of being scaled by a huge factor.
pub fn change_luminance(color: [f64; 3], new_lum: f64) -> [f64; 3] {
    let old_lum = luminance(color);
    if within_eps(old_lum, 0.0, LUM_EPSILON) {
        return color;
    }
    let scale = new_lum / old_lum;
    [color[0] * scale, color[1] * scale, color[2] * scale]
}

/// Map an HDR color into LDR with the extended Reinhard operator, relative
/// to the scene's maximum luminance `max_lum`.
///
/// The luminance curve maps `max_lum` to 1.0 and compresses everything
/// above smoothly; a final clamp absorbs rounding spill. More background:
/// <https://64.github.io/tonemapping/>
pub fn reinhard_map(color: [f64; 3], max_lum: f64) -> [f64; 3] {
    let old_lum = luminance(color);
    let factor = old_lum * (1.0 + old_lum / (max_lum * max_lum));
    let new_lum = factor / (1.0 + old_lum);
    clamp_color(change_luminance(color, new_lum))
}
