use crate::consts::SIGNAL_EPSILON;

use super::luma::LumaCoefficients;

/// `x * (1 - a) + y * a`
#[inline]
fn mix(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

/// Pull overbright pixels toward their luma before range compression.
///
/// A pixel whose luma stays below `desat` is left almost untouched; the
/// further luma exceeds it, the closer each channel moves to neutral. With
/// `desat <= 0` this is the identity.
#[inline]
pub fn desaturate(rgb: [f32; 3], coeffs: &LumaCoefficients, desat: f32) -> [f32; 3] {
    if desat <= 0.0 {
        return rgb;
    }
    let luma = coeffs.luma(rgb);
    let overbright = (luma - desat).max(SIGNAL_EPSILON) / luma.max(SIGNAL_EPSILON);
    [
        mix(rgb[0], luma, overbright),
        mix(rgb[1], luma, overbright),
        mix(rgb[2], luma, overbright),
    ]
}
