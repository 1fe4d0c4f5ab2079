/// Floor applied to signal and luma values before division.
pub const SIGNAL_EPSILON: f32 = 1e-6;

/// Floor for `peak - 1` in the Möbius curve's `b` term.
pub const MOBIUS_PEAK_EPSILON: f64 = 1e-6;

/// Signal below which the gamma curve switches to its linear extension.
pub const GAMMA_KNEE: f64 = 0.05;

/// Default exponent for the gamma curve when no parameter is given.
pub const DEFAULT_GAMMA_PARAM: f64 = 1.8;

/// Default knee for the Möbius curve when no parameter is given.
pub const DEFAULT_MOBIUS_PARAM: f64 = 0.3;

/// Parameter used by every other curve when none is given.
pub const DEFAULT_PARAM: f64 = 1.0;

/// Default desaturation strength.
pub const DEFAULT_DESAT: f64 = 2.0;

/// Luminance in cd/m² that corresponds to a signal value of 1.0.
pub const REFERENCE_WHITE: f64 = 100.0;

/// Fallback signal peak for PQ (SMPTE ST 2084) content without side data.
pub const PQ_FALLBACK_PEAK: f64 = 10_000.0 / REFERENCE_WHITE;

/// Fallback signal peak for any other content without side data
/// (HLG reference display at 1000 cd/m²).
pub const DEFAULT_FALLBACK_PEAK: f64 = 1_000.0 / REFERENCE_WHITE;

/// Fully-opaque alpha sample for float formats.
pub const OPAQUE_ALPHA: f32 = 1.0;

/// Size in bytes of one f32 sample.
pub const FLOAT_SAMPLE_BYTES: usize = 4;
