use serde::{Deserialize, Serialize};

use crate::consts::FLOAT_SAMPLE_BYTES;
use crate::error::{Result, TonemapError};

/// Pixel layouts a frame can be tagged with.
///
/// Only the two planar float layouts are accepted by the tone mapper; the
/// others exist so that negotiation has something to reject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Planar float RGB.
    Gbrpf32,
    /// Planar float RGB with an alpha plane.
    Gbrapf32,
    /// Packed float RGB.
    Rgbf32,
    /// Planar 16-bit integer RGB.
    Gbrp16,
}

impl PixelFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::Gbrpf32 => "gbrpf32",
            Self::Gbrapf32 => "gbrapf32",
            Self::Rgbf32 => "rgbf32",
            Self::Gbrp16 => "gbrp16",
        }
    }

    /// Whether the format stores an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Gbrapf32)
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Layouts the tone mapper accepts, in order of preference.
pub const SUPPORTED_FORMATS: [PixelFormat; 2] = [PixelFormat::Gbrpf32, PixelFormat::Gbrapf32];

/// Per-plane layout of a pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormatDescriptor {
    pub format: PixelFormat,
    /// Number of planes, including alpha.
    pub planes: usize,
    /// Distance in bytes between two samples of the same plane.
    pub step: usize,
    pub has_alpha: bool,
}

impl PixelFormatDescriptor {
    /// Descriptor for one of the supported planar float layouts.
    pub fn planar_float(format: PixelFormat) -> Option<Self> {
        match format {
            PixelFormat::Gbrpf32 => Some(Self {
                format,
                planes: 3,
                step: FLOAT_SAMPLE_BYTES,
                has_alpha: false,
            }),
            PixelFormat::Gbrapf32 => Some(Self {
                format,
                planes: 4,
                step: FLOAT_SAMPLE_BYTES,
                has_alpha: true,
            }),
            _ => None,
        }
    }

    /// Bytes occupied by one frame of `width x height` in this layout.
    pub fn frame_byte_size(&self, width: usize, height: usize) -> Option<usize> {
        width
            .checked_mul(height)?
            .checked_mul(self.step)?
            .checked_mul(self.planes)
    }
}

/// Check a format against the accepted list.
pub fn negotiate(format: PixelFormat) -> Result<PixelFormat> {
    if SUPPORTED_FORMATS.contains(&format) {
        Ok(format)
    } else {
        Err(TonemapError::UnsupportedFormat(format!(
            "{format} (expected one of gbrpf32, gbrapf32)"
        )))
    }
}
