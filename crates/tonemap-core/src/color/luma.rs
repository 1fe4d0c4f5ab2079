use crate::frame::ColorSpace;

/// Weights for computing luma from linear RGB. The three weights sum to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LumaCoefficients {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LumaCoefficients {
    pub const FCC: Self = Self::new(0.30, 0.59, 0.11);
    pub const BT601: Self = Self::new(0.299, 0.587, 0.114);
    pub const BT709: Self = Self::new(0.2126, 0.7152, 0.0722);
    pub const SMPTE240M: Self = Self::new(0.212, 0.701, 0.087);
    pub const BT2020: Self = Self::new(0.2627, 0.6780, 0.0593);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Weighted sum of the three channels.
    #[inline]
    pub fn luma(&self, rgb: [f32; 3]) -> f32 {
        self.r * rgb[0] + self.g * rgb[1] + self.b * rgb[2]
    }
}

/// Look up the luma weights for a color space.
///
/// Returns `None` for tags that have no entry: RGB, YCgCo, ICtCp, the
/// chroma-derived spaces, and the unspecified/reserved tags.
pub const fn luma_coefficients(space: ColorSpace) -> Option<LumaCoefficients> {
    match space {
        ColorSpace::Fcc => Some(LumaCoefficients::FCC),
        ColorSpace::Bt470bg | ColorSpace::Smpte170m => Some(LumaCoefficients::BT601),
        ColorSpace::Bt709 => Some(LumaCoefficients::BT709),
        ColorSpace::Smpte240m => Some(LumaCoefficients::SMPTE240M),
        ColorSpace::Bt2020Ncl | ColorSpace::Bt2020Cl => Some(LumaCoefficients::BT2020),
        ColorSpace::Rgb
        | ColorSpace::Unspecified
        | ColorSpace::Reserved
        | ColorSpace::Ycgco
        | ColorSpace::Smpte2085
        | ColorSpace::ChromaDerivedNcl
        | ColorSpace::ChromaDerivedCl
        | ColorSpace::Ictcp => None,
    }
}
