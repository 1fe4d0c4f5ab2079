use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DESAT, DEFAULT_GAMMA_PARAM, DEFAULT_MOBIUS_PARAM, DEFAULT_PARAM};
use crate::error::{Result, TonemapError};
use crate::tonemap::Algorithm;

/// User-facing tone mapping configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMapConfig {
    pub algorithm: Algorithm,
    /// Curve parameter. `None` selects the algorithm's default.
    ///
    /// linear: scale factor. gamma: exponent. clip: scale factor before
    /// clipping. reinhard: local contrast in (0, 1]. mobius: knee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<f64>,
    /// Desaturation strength for overbright pixels; 0 disables it.
    pub desat: f64,
    /// Signal peak override; 0 reads it from the frame's side data.
    pub peak: f64,
}

impl Default for ToneMapConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::None,
            param: None,
            desat: DEFAULT_DESAT,
            peak: 0.0,
        }
    }
}

impl ToneMapConfig {
    /// Reject values outside the accepted ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(param) = self.param {
            if !param.is_finite() || param <= 0.0 {
                return Err(TonemapError::InvalidConfig(format!(
                    "param must be a positive finite number, got {param}"
                )));
            }
            if self.algorithm == Algorithm::Reinhard && param > 1.0 {
                return Err(TonemapError::InvalidConfig(format!(
                    "reinhard contrast must be in (0, 1], got {param}"
                )));
            }
        }
        if !self.desat.is_finite() || self.desat < 0.0 {
            return Err(TonemapError::InvalidConfig(format!(
                "desat must be >= 0, got {}",
                self.desat
            )));
        }
        if !self.peak.is_finite() || self.peak < 0.0 {
            return Err(TonemapError::InvalidConfig(format!(
                "peak must be >= 0, got {}",
                self.peak
            )));
        }
        Ok(())
    }

    /// Resolve the curve parameter for the selected algorithm.
    ///
    /// Consumes the configuration: the reinhard contrast-to-knee transform
    /// must be applied exactly once.
    pub fn initialize(self) -> ToneMapParams {
        let param = match (self.algorithm, self.param) {
            (Algorithm::Gamma, None) => DEFAULT_GAMMA_PARAM,
            (Algorithm::Mobius, None) => DEFAULT_MOBIUS_PARAM,
            (Algorithm::Reinhard, Some(contrast)) => (1.0 - contrast) / contrast,
            (_, Some(param)) => param,
            (_, None) => DEFAULT_PARAM,
        };
        ToneMapParams {
            algorithm: self.algorithm,
            param,
            desat: self.desat,
            peak: self.peak,
        }
    }
}

/// Configuration after parameter initialization. Immutable for the
/// lifetime of a tone mapper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneMapParams {
    pub algorithm: Algorithm,
    /// Always set. For reinhard this is the knee derived from the contrast.
    pub param: f64,
    pub desat: f64,
    pub peak: f64,
}
