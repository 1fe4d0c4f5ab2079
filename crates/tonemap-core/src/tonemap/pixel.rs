use crate::color::desaturate::desaturate;
use crate::color::luma::LumaCoefficients;
use crate::consts::SIGNAL_EPSILON;

use super::curve::ToneCurve;

/// Everything needed to map one pixel, fixed for the duration of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelMapper {
    curve: ToneCurve,
    coeffs: Option<LumaCoefficients>,
    desat: f32,
}

impl PixelMapper {
    /// Without coefficients desaturation is disabled whatever `desat` says.
    pub fn new(curve: ToneCurve, coeffs: Option<LumaCoefficients>, desat: f32) -> Self {
        let desat = if coeffs.is_some() { desat } else { 0.0 };
        Self {
            curve,
            coeffs,
            desat,
        }
    }

    pub fn curve(&self) -> &ToneCurve {
        &self.curve
    }

    /// Effective desaturation strength.
    pub fn desat(&self) -> f32 {
        self.desat
    }

    /// Desaturate, then scale all three channels by the ratio the curve
    /// applies to the brightest one.
    #[inline]
    pub fn map(&self, rgb: [f32; 3]) -> [f32; 3] {
        let rgb = match &self.coeffs {
            Some(coeffs) => desaturate(rgb, coeffs, self.desat),
            None => rgb,
        };
        let signal = rgb[0].max(rgb[1]).max(rgb[2]).max(SIGNAL_EPSILON);
        let scale = self.curve.apply(signal) / signal;
        [rgb[0] * scale, rgb[1] * scale, rgb[2] * scale]
    }
}
