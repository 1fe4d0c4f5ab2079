use serde::{Deserialize, Serialize};

use crate::consts::{GAMMA_KNEE, MOBIUS_PEAK_EPSILON};

/// Tone curve family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Pass the signal through unchanged.
    #[default]
    None,
    /// Scale by `param / peak`.
    Linear,
    /// Power curve with exponent `1 / param`.
    Gamma,
    /// Multiply by `param` and hard-clip to [0, 1].
    Clip,
    /// Reinhard's operator with a configurable knee.
    Reinhard,
    /// John Hable's filmic curve.
    Hable,
    /// Identity up to a knee, then a Möbius roll-off to peak.
    Mobius,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Self::None,
        Self::Linear,
        Self::Gamma,
        Self::Clip,
        Self::Reinhard,
        Self::Hable,
        Self::Mobius,
    ];
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Linear => write!(f, "linear"),
            Self::Gamma => write!(f, "gamma"),
            Self::Clip => write!(f, "clip"),
            Self::Reinhard => write!(f, "reinhard"),
            Self::Hable => write!(f, "hable"),
            Self::Mobius => write!(f, "mobius"),
        }
    }
}

/// Hable filmic curve before white-point normalization.
pub fn hable(x: f64) -> f64 {
    const A: f64 = 0.15;
    const B: f64 = 0.50;
    const C: f64 = 0.10;
    const D: f64 = 0.20;
    const E: f64 = 0.02;
    const F: f64 = 0.30;
    (x * (x * A + B * C) + D * E) / (x * (x * A + B) + D * F) - E / F
}

/// Möbius curve: identity up to `knee`, then a rational roll-off that
/// reaches `peak` smoothly. A knee at or above the peak leaves nothing to
/// compress, so the curve is the identity.
pub fn mobius(x: f64, knee: f64, peak: f64) -> f64 {
    if x <= knee || knee >= peak {
        return x;
    }
    let j = knee;
    let a = -j * j * (peak - 1.0) / (j * j - 2.0 * j + peak).max(MOBIUS_PEAK_EPSILON);
    let b = (j * j - 2.0 * j * peak + peak) / (peak - 1.0).max(MOBIUS_PEAK_EPSILON);
    (b * b + 2.0 * b * j + j * j) / (b - a) * (x + a) / (x + b)
}

/// A tone curve bound to one frame's peak.
///
/// Anything that depends only on the peak (Hable's white point) is
/// evaluated here once rather than per pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneCurve {
    algorithm: Algorithm,
    param: f64,
    peak: f64,
    hable_white: f64,
}

impl ToneCurve {
    /// `param` must already be initialized (see `ToneMapConfig::initialize`);
    /// for reinhard it is the knee, not the contrast.
    pub fn new(algorithm: Algorithm, param: f64, peak: f64) -> Self {
        let hable_white = match algorithm {
            Algorithm::Hable => hable(peak),
            _ => 1.0,
        };
        Self {
            algorithm,
            param,
            peak,
            hable_white,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Map a brightest-channel signal value to its compressed value.
    #[inline]
    pub fn apply(&self, signal: f32) -> f32 {
        let sig = signal as f64;
        let peak = self.peak;
        let param = self.param;
        let mapped = match self.algorithm {
            Algorithm::None => return signal,
            Algorithm::Linear => sig * param / peak,
            Algorithm::Gamma => {
                if sig > GAMMA_KNEE {
                    (sig / peak).powf(1.0 / param)
                } else {
                    sig * (GAMMA_KNEE / peak).powf(1.0 / param) / GAMMA_KNEE
                }
            }
            Algorithm::Clip => (sig * param).clamp(0.0, 1.0),
            Algorithm::Hable => hable(sig) / self.hable_white,
            Algorithm::Reinhard => sig / (sig + param) * (peak + param) / peak,
            Algorithm::Mobius => mobius(sig, param, peak),
        };
        mapped as f32
    }
}

/// One-off evaluation of a curve. Prefer building a `ToneCurve` once when
/// mapping many values against the same peak.
pub fn map_signal(signal: f32, algorithm: Algorithm, param: f64, peak: f64) -> f32 {
    ToneCurve::new(algorithm, param, peak).apply(signal)
}
