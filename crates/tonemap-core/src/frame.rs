use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TonemapError};
use crate::format::PixelFormat;

/// A planar floating-point video frame.
///
/// Each plane is row-major with shape `(height, width)`. Values are
/// linear light where 1.0 is reference white; they are not clamped.
#[derive(Clone, Debug)]
pub struct Frame {
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
    /// Present exactly when `format` carries alpha.
    pub alpha: Option<Array2<f32>>,
    pub format: PixelFormat,
    pub metadata: FrameMetadata,
}

impl Frame {
    /// Build a frame from separate planes. All planes must share one shape.
    pub fn from_planes(
        red: Array2<f32>,
        green: Array2<f32>,
        blue: Array2<f32>,
        alpha: Option<Array2<f32>>,
    ) -> Result<Self> {
        let expected = red.dim();
        let others = [Some(&green), Some(&blue), alpha.as_ref()];
        for plane in others.into_iter().flatten() {
            if plane.dim() != expected {
                return Err(TonemapError::PlaneMismatch {
                    expected,
                    actual: plane.dim(),
                });
            }
        }
        let format = if alpha.is_some() {
            PixelFormat::Gbrapf32
        } else {
            PixelFormat::Gbrpf32
        };
        Ok(Self {
            red,
            green,
            blue,
            alpha,
            format,
            metadata: FrameMetadata::default(),
        })
    }

    /// A frame where every pixel has the same RGB value.
    pub fn uniform(height: usize, width: usize, rgb: [f32; 3]) -> Self {
        Self {
            red: Array2::from_elem((height, width), rgb[0]),
            green: Array2::from_elem((height, width), rgb[1]),
            blue: Array2::from_elem((height, width), rgb[2]),
            alpha: None,
            format: PixelFormat::Gbrpf32,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: FrameMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn width(&self) -> usize {
        self.red.ncols()
    }

    pub fn height(&self) -> usize {
        self.red.nrows()
    }

    /// RGB triple at `(row, col)`.
    pub fn rgb(&self, row: usize, col: usize) -> [f32; 3] {
        [
            self.red[[row, col]],
            self.green[[row, col]],
            self.blue[[row, col]],
        ]
    }

    /// Largest channel value anywhere in the frame.
    pub fn max_signal(&self) -> f32 {
        [&self.red, &self.green, &self.blue]
            .iter()
            .flat_map(|plane| plane.iter())
            .copied()
            .fold(0.0f32, f32::max)
    }
}

/// Per-frame metadata carried alongside the pixel planes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetadata {
    pub color_space: ColorSpace,
    pub color_trc: TransferCharacteristic,
    pub content_light: Option<ContentLightLevel>,
    pub mastering_display: Option<MasteringDisplay>,
    /// Presentation timestamp, if the source provides one.
    pub pts: Option<i64>,
}

/// Content light level side data, in cd/m².
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentLightLevel {
    pub max_cll: u32,
    pub max_fall: u32,
}

/// Mastering display side data. Luminance values are in cd/m².
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MasteringDisplay {
    pub max_luminance: Option<f64>,
    pub min_luminance: Option<f64>,
}

/// Matrix coefficients tag (the color space a frame was encoded in).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSpace {
    Rgb,
    Bt709,
    #[default]
    Unspecified,
    Reserved,
    Fcc,
    Bt470bg,
    Smpte170m,
    Smpte240m,
    Ycgco,
    Bt2020Ncl,
    Bt2020Cl,
    Smpte2085,
    ChromaDerivedNcl,
    ChromaDerivedCl,
    Ictcp,
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rgb => "gbr",
            Self::Bt709 => "bt709",
            Self::Unspecified => "unknown",
            Self::Reserved => "reserved",
            Self::Fcc => "fcc",
            Self::Bt470bg => "bt470bg",
            Self::Smpte170m => "smpte170m",
            Self::Smpte240m => "smpte240m",
            Self::Ycgco => "ycgco",
            Self::Bt2020Ncl => "bt2020nc",
            Self::Bt2020Cl => "bt2020c",
            Self::Smpte2085 => "smpte2085",
            Self::ChromaDerivedNcl => "chroma-derived-nc",
            Self::ChromaDerivedCl => "chroma-derived-c",
            Self::Ictcp => "ictcp",
        };
        write!(f, "{name}")
    }
}

/// Transfer characteristic tag (how stored values relate to light).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferCharacteristic {
    Bt709,
    #[default]
    Unspecified,
    Gamma22,
    Gamma28,
    Smpte170m,
    Smpte240m,
    Linear,
    Log,
    LogSqrt,
    Iec61966_2_4,
    Bt1361e,
    Iec61966_2_1,
    Bt2020_10,
    Bt2020_12,
    Smpte2084,
    Smpte428,
    AribStdB67,
}

impl std::fmt::Display for TransferCharacteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bt709 => "bt709",
            Self::Unspecified => "unknown",
            Self::Gamma22 => "bt470m",
            Self::Gamma28 => "bt470bg",
            Self::Smpte170m => "smpte170m",
            Self::Smpte240m => "smpte240m",
            Self::Linear => "linear",
            Self::Log => "log100",
            Self::LogSqrt => "log316",
            Self::Iec61966_2_4 => "iec61966-2-4",
            Self::Bt1361e => "bt1361e",
            Self::Iec61966_2_1 => "iec61966-2-1",
            Self::Bt2020_10 => "bt2020-10",
            Self::Bt2020_12 => "bt2020-12",
            Self::Smpte2084 => "smpte2084",
            Self::Smpte428 => "smpte428",
            Self::AribStdB67 => "arib-std-b67",
        };
        write!(f, "{name}")
    }
}
