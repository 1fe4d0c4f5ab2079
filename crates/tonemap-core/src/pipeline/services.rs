//! Seams to the rest of a video pipeline.
//!
//! The tone mapper never allocates, inspects side data, or emits frames
//! directly; it goes through these traits. Each one has a default
//! implementation good enough for standalone use.

use std::sync::Arc;

use ndarray::Array2;

use crate::consts::{DEFAULT_FALLBACK_PEAK, PQ_FALLBACK_PEAK, REFERENCE_WHITE};
use crate::error::{Result, TonemapError};
use crate::format::{PixelFormat, PixelFormatDescriptor};
use crate::frame::{Frame, FrameMetadata, TransferCharacteristic};

/// Maps a pixel format tag to its plane layout.
pub trait FormatResolver: Send + Sync {
    fn resolve(&self, format: PixelFormat) -> Option<PixelFormatDescriptor>;
}

/// Estimates the signal peak of a frame when none is configured.
pub trait PeakEstimator: Send + Sync {
    /// Must return a positive value.
    fn estimate(&self, frame: &Frame) -> f64;
}

/// Copies per-frame properties from the input to the output frame.
pub trait MetadataCopier: Send + Sync {
    fn copy(&self, from: &FrameMetadata, to: &mut FrameMetadata) -> Result<()>;
}

/// Rewrites HDR side data of the output frame to match the new peak.
pub trait HdrMetadataUpdater: Send + Sync {
    fn update(&self, frame: &mut Frame, peak: f64);
}

/// Provides output frame storage.
pub trait FrameAllocator: Send + Sync {
    fn allocate(&self, width: usize, height: usize, format: PixelFormat) -> Result<Frame>;
}

/// Downstream consumer of processed frames.
pub trait FrameSink {
    fn push(&mut self, frame: Frame) -> Result<()>;
}

impl FrameSink for Vec<Frame> {
    fn push(&mut self, frame: Frame) -> Result<()> {
        Vec::push(self, frame);
        Ok(())
    }
}

/// Resolves the planar float formats and nothing else.
pub struct StandardFormats;

impl FormatResolver for StandardFormats {
    fn resolve(&self, format: PixelFormat) -> Option<PixelFormatDescriptor> {
        PixelFormatDescriptor::planar_float(format)
    }
}

/// Peak from content light level, then mastering display, then a
/// transfer-dependent fallback.
pub struct SideDataPeak;

impl PeakEstimator for SideDataPeak {
    fn estimate(&self, frame: &Frame) -> f64 {
        let meta = &frame.metadata;
        let from_cll = meta
            .content_light
            .map(|cll| cll.max_cll as f64 / REFERENCE_WHITE)
            .filter(|&peak| peak > 0.0);
        let from_mastering = || {
            meta.mastering_display
                .and_then(|md| md.max_luminance)
                .map(|lum| lum / REFERENCE_WHITE)
                .filter(|&peak| peak > 0.0)
        };
        from_cll.or_else(from_mastering).unwrap_or(match meta.color_trc {
            TransferCharacteristic::Smpte2084 => PQ_FALLBACK_PEAK,
            _ => DEFAULT_FALLBACK_PEAK,
        })
    }
}

/// Clones every metadata field.
pub struct CopyProps;

impl MetadataCopier for CopyProps {
    fn copy(&self, from: &FrameMetadata, to: &mut FrameMetadata) -> Result<()> {
        to.clone_from(from);
        Ok(())
    }
}

/// Rewrites MaxCLL and mastering max luminance when they are present.
pub struct SideDataUpdater;

impl HdrMetadataUpdater for SideDataUpdater {
    fn update(&self, frame: &mut Frame, peak: f64) {
        let nits = peak * REFERENCE_WHITE;
        if let Some(cll) = frame.metadata.content_light.as_mut() {
            cll.max_cll = nits as u32;
        }
        if let Some(md) = frame.metadata.mastering_display.as_mut() {
            if md.max_luminance.is_some() {
                md.max_luminance = Some(nits);
            }
        }
    }
}

/// Heap allocation that reports failure instead of aborting.
pub struct HeapAllocator;

impl HeapAllocator {
    fn plane(width: usize, height: usize) -> Result<Array2<f32>> {
        let oom = || TonemapError::OutOfMemory { width, height };
        let len = width.checked_mul(height).ok_or_else(oom)?;
        let mut buf: Vec<f32> = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| oom())?;
        buf.resize(len, 0.0);
        Array2::from_shape_vec((height, width), buf)
            .map_err(|e| TonemapError::Internal(format!("plane shape: {e}")))
    }
}

impl FrameAllocator for HeapAllocator {
    fn allocate(&self, width: usize, height: usize, format: PixelFormat) -> Result<Frame> {
        let desc = PixelFormatDescriptor::planar_float(format)
            .ok_or_else(|| TonemapError::UnsupportedFormat(format.to_string()))?;
        let alpha = if desc.has_alpha {
            Some(Self::plane(width, height)?)
        } else {
            None
        };
        Frame::from_planes(
            Self::plane(width, height)?,
            Self::plane(width, height)?,
            Self::plane(width, height)?,
            alpha,
        )
    }
}

/// The full set of collaborators a tone mapper talks to.
#[derive(Clone)]
pub struct Services {
    pub formats: Arc<dyn FormatResolver>,
    pub peak: Arc<dyn PeakEstimator>,
    pub metadata: Arc<dyn MetadataCopier>,
    pub hdr: Arc<dyn HdrMetadataUpdater>,
    pub allocator: Arc<dyn FrameAllocator>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            formats: Arc::new(StandardFormats),
            peak: Arc::new(SideDataPeak),
            metadata: Arc::new(CopyProps),
            hdr: Arc::new(SideDataUpdater),
            allocator: Arc::new(HeapAllocator),
        }
    }
}
