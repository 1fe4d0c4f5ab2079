#![allow(dead_code)]

use ndarray::Array2;

use tonemap_core::error::{Result, TonemapError};
use tonemap_core::format::{PixelFormat, PixelFormatDescriptor};
use tonemap_core::frame::{
    ColorSpace, ContentLightLevel, Frame, FrameMetadata, MasteringDisplay, TransferCharacteristic,
};
use tonemap_core::pipeline::services::{
    FormatResolver, FrameAllocator, MetadataCopier, PeakEstimator,
};
use tonemap_core::pipeline::FrameSink;

/// Linear-light BT.709 metadata with no side data.
pub fn linear_bt709() -> FrameMetadata {
    FrameMetadata {
        color_space: ColorSpace::Bt709,
        color_trc: TransferCharacteristic::Linear,
        ..FrameMetadata::default()
    }
}

/// A uniform frame tagged linear BT.709.
pub fn uniform_frame(height: usize, width: usize, rgb: [f32; 3]) -> Frame {
    Frame::uniform(height, width, rgb).with_metadata(linear_bt709())
}

/// A frame whose pixels are all different, ranging well above 1.0.
pub fn gradient_frame(height: usize, width: usize) -> Frame {
    let red = Array2::from_shape_fn((height, width), |(r, c)| 0.05 + (r * width + c) as f32 * 0.13);
    let green = Array2::from_shape_fn((height, width), |(r, c)| 0.02 + (r + 2 * c) as f32 * 0.07);
    let blue = Array2::from_shape_fn((height, width), |(r, c)| 0.01 + ((r * 3 + c) % 11) as f32 * 0.4);
    Frame::from_planes(red, green, blue, None)
        .unwrap()
        .with_metadata(linear_bt709())
}

/// `gradient_frame` with an alpha plane of distinct values.
pub fn gradient_frame_rgba(height: usize, width: usize) -> Frame {
    let base = gradient_frame(height, width);
    let alpha = Array2::from_shape_fn((height, width), |(r, c)| ((r * width + c) % 7) as f32 / 7.0);
    let metadata = base.metadata.clone();
    Frame::from_planes(base.red, base.green, base.blue, Some(alpha))
        .unwrap()
        .with_metadata(metadata)
}

pub fn with_content_light(mut frame: Frame, max_cll: u32) -> Frame {
    frame.metadata.content_light = Some(ContentLightLevel {
        max_cll,
        max_fall: max_cll / 4,
    });
    frame
}

pub fn with_mastering_peak(mut frame: Frame, nits: f64) -> Frame {
    frame.metadata.mastering_display = Some(MasteringDisplay {
        max_luminance: Some(nits),
        min_luminance: Some(0.005),
    });
    frame
}

/// Assert two planes match element-wise within `tol`.
pub fn assert_planes_close(a: &Array2<f32>, b: &Array2<f32>, tol: f32) {
    assert_eq!(a.dim(), b.dim(), "plane shapes differ");
    for (idx, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!((x - y).abs() <= tol, "sample {idx}: {x} vs {y}");
    }
}

/// Allocator that always fails.
pub struct FailingAllocator;

impl FrameAllocator for FailingAllocator {
    fn allocate(&self, width: usize, height: usize, _format: PixelFormat) -> Result<Frame> {
        Err(TonemapError::OutOfMemory { width, height })
    }
}

/// Metadata copier that always fails.
pub struct FailingCopier;

impl MetadataCopier for FailingCopier {
    fn copy(&self, _from: &FrameMetadata, _to: &mut FrameMetadata) -> Result<()> {
        Err(TonemapError::Metadata("side data copy refused".into()))
    }
}

/// Resolver that knows no formats.
pub struct NoFormats;

impl FormatResolver for NoFormats {
    fn resolve(&self, _format: PixelFormat) -> Option<PixelFormatDescriptor> {
        None
    }
}

/// Estimator that returns a fixed peak.
pub struct FixedPeak(pub f64);

impl PeakEstimator for FixedPeak {
    fn estimate(&self, _frame: &Frame) -> f64 {
        self.0
    }
}

/// Sink that accepts `capacity` frames and then rejects.
pub struct BoundedSink {
    pub frames: Vec<Frame>,
    pub capacity: usize,
}

impl FrameSink for BoundedSink {
    fn push(&mut self, frame: Frame) -> Result<()> {
        if self.frames.len() >= self.capacity {
            return Err(TonemapError::Sink("downstream is full".into()));
        }
        self.frames.push(frame);
        Ok(())
    }
}
