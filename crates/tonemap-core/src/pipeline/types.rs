use crate::color::luma::LumaCoefficients;

/// Values resolved for a single frame. Nothing here outlives the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Signal peak the curves normalize against. Always positive.
    pub peak: f64,
    pub coefficients: Option<LumaCoefficients>,
    /// Desaturation strength actually applied to this frame.
    pub desat: f64,
}

/// Thread-safe progress reporting for frame streams.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A stream has started. `total_frames` is known for seekable sources.
    fn begin(&self, _total_frames: Option<usize>) {}

    /// `frames_done` frames have been emitted downstream.
    fn advance(&self, _frames_done: usize) {}

    /// The stream is finished.
    fn finish(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
