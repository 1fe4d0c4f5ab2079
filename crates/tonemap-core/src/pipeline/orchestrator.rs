use tracing::{debug, info, warn};

use crate::color::luma::luma_coefficients;
use crate::error::{Result, TonemapError};
use crate::format::{negotiate, PixelFormat};
use crate::frame::{ColorSpace, Frame, TransferCharacteristic};
use crate::tonemap::{PixelMapper, ToneCurve};

use super::config::{ToneMapConfig, ToneMapParams};
use super::services::{FrameSink, Services};
use super::slice::{execute, SliceTask};
use super::types::{FrameContext, ProgressReporter};

/// A configured tone mapping filter instance.
///
/// Frames are processed one at a time, in the order they are handed in.
/// The parameters never change after construction; anything that depends
/// on an individual frame lives in a `FrameContext`.
pub struct Tonemapper {
    params: ToneMapParams,
    services: Services,
    output_format: Option<PixelFormat>,
    workers: Option<usize>,
}

impl Tonemapper {
    /// Validate and initialize `config`.
    pub fn new(config: ToneMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            params: config.initialize(),
            services: Services::default(),
            output_format: None,
            workers: None,
        })
    }

    pub fn with_services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Force the output layout. By default output matches the input.
    pub fn with_output_format(mut self, format: PixelFormat) -> Result<Self> {
        self.output_format = Some(negotiate(format)?);
        Ok(self)
    }

    /// Cap the number of row bands per frame. Defaults to the rayon pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    pub fn params(&self) -> &ToneMapParams {
        &self.params
    }

    /// Number of row bands a frame is split into at most.
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(rayon::current_num_threads).max(1)
    }

    /// Resolve the peak, luma coefficients and effective desaturation for
    /// one frame.
    pub fn resolve_frame(&self, input: &Frame) -> Result<FrameContext> {
        self.resolve(input, true)
    }

    /// Same values as `resolve_frame`, without emitting diagnostics. For
    /// previewing a frame that will be processed afterwards.
    pub fn describe_frame(&self, input: &Frame) -> Result<FrameContext> {
        self.resolve(input, false)
    }

    fn resolve(&self, input: &Frame, diagnostics: bool) -> Result<FrameContext> {
        let peak = if self.params.peak == 0.0 {
            let peak = self.services.peak.estimate(input);
            if diagnostics {
                debug!(peak, "Computed signal peak");
            }
            peak
        } else {
            self.params.peak
        };
        if !(peak.is_finite() && peak > 0.0) {
            return Err(TonemapError::Internal(format!(
                "signal peak must be positive, got {peak}"
            )));
        }

        let space = input.metadata.color_space;
        let coefficients = luma_coefficients(space);
        let mut desat = self.params.desat;
        if desat > 0.0 && (space == ColorSpace::Unspecified || coefficients.is_none()) {
            match (diagnostics, space) {
                (false, _) => {}
                (true, ColorSpace::Unspecified) => {
                    warn!("Missing color space information, desaturation is disabled")
                }
                (true, space) => {
                    warn!(color_space = %space, "Unsupported color space, desaturation is disabled")
                }
            }
            desat = 0.0;
        }

        Ok(FrameContext {
            peak,
            coefficients,
            desat,
        })
    }

    /// Tone-map one frame and return the new output frame.
    ///
    /// The input is consumed and released whether or not processing succeeds.
    pub fn process(&self, input: Frame) -> Result<Frame> {
        negotiate(input.format)?;
        let out_format = self.output_format.unwrap_or(input.format);

        let formats = &self.services.formats;
        let (input_desc, output_desc) =
            match (formats.resolve(input.format), formats.resolve(out_format)) {
                (Some(i), Some(o)) => (i, o),
                _ => {
                    return Err(TonemapError::Internal(format!(
                        "no descriptor for {} -> {}",
                        input.format, out_format
                    )))
                }
            };

        let (width, height) = (input.width(), input.height());
        let mut output = self.services.allocator.allocate(width, height, out_format)?;
        self.services
            .metadata
            .copy(&input.metadata, &mut output.metadata)?;

        match input.metadata.color_trc {
            TransferCharacteristic::Linear => {}
            TransferCharacteristic::Unspecified => {
                warn!("Untagged transfer, assuming linear light");
                output.metadata.color_trc = TransferCharacteristic::Linear;
            }
            trc => warn!(transfer = %trc, "Tone mapping works on linear light only"),
        }

        let ctx = self.resolve_frame(&input)?;
        let curve = ToneCurve::new(self.params.algorithm, self.params.param, ctx.peak);
        let task = SliceTask {
            input: &input,
            input_desc,
            output_desc,
            mapper: PixelMapper::new(curve, ctx.coefficients, ctx.desat as f32),
        };
        execute(&task, &mut output, self.workers())?;
        drop(input);

        self.services.hdr.update(&mut output, ctx.peak);
        Ok(output)
    }

    /// Process one frame and hand the result to `sink`.
    pub fn filter_frame(&self, input: Frame, sink: &mut dyn FrameSink) -> Result<()> {
        let output = self.process(input)?;
        sink.push(output)
    }

    /// Process frames in arrival order until the source is exhausted or a
    /// frame fails. Returns the number of frames emitted.
    pub fn run_stream<I>(
        &self,
        frames: I,
        sink: &mut dyn FrameSink,
        reporter: &dyn ProgressReporter,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Frame>>,
    {
        let frames = frames.into_iter();
        let (lower, upper) = frames.size_hint();
        reporter.begin(upper.filter(|&u| u == lower));

        let mut done = 0;
        for frame in frames {
            self.filter_frame(frame?, sink)?;
            done += 1;
            reporter.advance(done);
        }
        reporter.finish();
        info!(
            frames = done,
            algorithm = %self.params.algorithm,
            "Stream tone mapping complete"
        );
        Ok(done)
    }
}
