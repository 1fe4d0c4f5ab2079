use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tonemap_core::frame::{
    ColorSpace, ContentLightLevel, FrameMetadata, MasteringDisplay, TransferCharacteristic,
};
use tonemap_core::pipeline::ToneMapConfig;
use tonemap_core::tonemap::Algorithm;

#[derive(Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    None,
    Linear,
    Gamma,
    Clip,
    Reinhard,
    Hable,
    Mobius,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::None => Algorithm::None,
            AlgorithmArg::Linear => Algorithm::Linear,
            AlgorithmArg::Gamma => Algorithm::Gamma,
            AlgorithmArg::Clip => Algorithm::Clip,
            AlgorithmArg::Reinhard => Algorithm::Reinhard,
            AlgorithmArg::Hable => Algorithm::Hable,
            AlgorithmArg::Mobius => Algorithm::Mobius,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorSpaceArg {
    Bt709,
    Bt2020,
    Bt601,
    Bt470bg,
    Smpte240m,
    Fcc,
    Rgb,
    Unspecified,
}

impl From<ColorSpaceArg> for ColorSpace {
    fn from(arg: ColorSpaceArg) -> Self {
        match arg {
            ColorSpaceArg::Bt709 => ColorSpace::Bt709,
            ColorSpaceArg::Bt2020 => ColorSpace::Bt2020Ncl,
            ColorSpaceArg::Bt601 => ColorSpace::Smpte170m,
            ColorSpaceArg::Bt470bg => ColorSpace::Bt470bg,
            ColorSpaceArg::Smpte240m => ColorSpace::Smpte240m,
            ColorSpaceArg::Fcc => ColorSpace::Fcc,
            ColorSpaceArg::Rgb => ColorSpace::Rgb,
            ColorSpaceArg::Unspecified => ColorSpace::Unspecified,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TransferArg {
    Linear,
    Pq,
    Hlg,
    Srgb,
    Bt709,
    Unspecified,
}

impl From<TransferArg> for TransferCharacteristic {
    fn from(arg: TransferArg) -> Self {
        match arg {
            TransferArg::Linear => TransferCharacteristic::Linear,
            TransferArg::Pq => TransferCharacteristic::Smpte2084,
            TransferArg::Hlg => TransferCharacteristic::AribStdB67,
            TransferArg::Srgb => TransferCharacteristic::Iec61966_2_1,
            TransferArg::Bt709 => TransferCharacteristic::Bt709,
            TransferArg::Unspecified => TransferCharacteristic::Unspecified,
        }
    }
}

/// Tone mapping options shared by `apply` and `stream`.
#[derive(Args)]
pub struct ToneMapArgs {
    /// TOML config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tone curve
    #[arg(short, long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Curve parameter (gamma exponent, reinhard contrast, mobius knee, ...)
    #[arg(short, long)]
    pub param: Option<f64>,

    /// Desaturation strength for overbright pixels (0 disables)
    #[arg(long)]
    pub desat: Option<f64>,

    /// Signal peak override, relative to reference white (0 = from metadata)
    #[arg(long)]
    pub peak: Option<f64>,

    /// Number of row bands per frame (default: one per thread)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl ToneMapArgs {
    /// Load the config file if given, then apply flag overrides.
    pub fn build_config(&self) -> Result<ToneMapConfig> {
        let mut config = match self.config {
            Some(ref path) => load_config(path)?,
            None => ToneMapConfig::default(),
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm.into();
        }
        if let Some(param) = self.param {
            config.param = Some(param);
        }
        if let Some(desat) = self.desat {
            config.desat = desat;
        }
        if let Some(peak) = self.peak {
            config.peak = peak;
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ToneMapConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Frame metadata that still images and raw streams do not carry.
#[derive(Args)]
pub struct MetadataArgs {
    /// Matrix coefficients the frames were encoded with
    #[arg(long, value_enum)]
    pub color_space: Option<ColorSpaceArg>,

    /// Transfer characteristic tag
    #[arg(long, value_enum)]
    pub transfer: Option<TransferArg>,

    /// MaxCLL content light level in cd/m²
    #[arg(long)]
    pub max_cll: Option<u32>,

    /// Mastering display peak luminance in cd/m²
    #[arg(long)]
    pub mastering_peak: Option<f64>,
}

impl MetadataArgs {
    /// Overlay the given tags onto `meta`.
    pub fn apply_to(&self, meta: &mut FrameMetadata) {
        if let Some(space) = self.color_space {
            meta.color_space = space.into();
        }
        if let Some(trc) = self.transfer {
            meta.color_trc = trc.into();
        }
        if let Some(max_cll) = self.max_cll {
            meta.content_light = Some(ContentLightLevel {
                max_cll,
                max_fall: 0,
            });
        }
        if let Some(peak) = self.mastering_peak {
            meta.mastering_display = Some(MasteringDisplay {
                max_luminance: Some(peak),
                min_luminance: None,
            });
        }
    }
}
