mod common;

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;

use tonemap_core::error::{Result, TonemapError};
use tonemap_core::format::PixelFormat;
use tonemap_core::frame::{ColorSpace, Frame, TransferCharacteristic};
use tonemap_core::pipeline::{
    FrameSink, NoOpReporter, ProgressReporter, Services, ToneMapConfig, Tonemapper,
};
use tonemap_core::tonemap::Algorithm;

use common::{
    assert_planes_close, gradient_frame, gradient_frame_rgba, uniform_frame, with_content_light,
    with_mastering_peak, BoundedSink, FailingAllocator, FailingCopier, FixedPeak, NoFormats,
};

fn tonemapper(algorithm: Algorithm, param: Option<f64>, peak: f64, desat: f64) -> Tonemapper {
    Tonemapper::new(ToneMapConfig {
        algorithm,
        param,
        desat,
        peak,
    })
    .unwrap()
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_clip_scenario() {
    let tm = tonemapper(Algorithm::Clip, Some(1.0), 4.0, 0.0);
    let out = tm.process(uniform_frame(3, 3, [2.0, 2.0, 2.0])).unwrap();
    for row in 0..3 {
        for col in 0..3 {
            assert_eq!(out.rgb(row, col), [1.0, 1.0, 1.0]);
        }
    }
}

#[test]
fn test_linear_scenario() {
    let tm = tonemapper(Algorithm::Linear, Some(1.0), 2.0, 0.0);
    let out = tm.process(uniform_frame(2, 4, [2.0, 2.0, 2.0])).unwrap();
    for v in out.red.iter().chain(out.green.iter()).chain(out.blue.iter()) {
        assert_abs_diff_eq!(*v, 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_none_scenario_exact() {
    let tm = tonemapper(Algorithm::None, None, 0.0, 0.0);
    let out = tm.process(uniform_frame(2, 2, [0.3, 0.7, 0.1])).unwrap();
    assert_eq!(out.rgb(1, 1), [0.3, 0.7, 0.1]);
}

#[test]
fn test_mobius_default_knee_peak_one_is_finite() {
    let tm = tonemapper(Algorithm::Mobius, None, 1.0, 0.0);
    assert_eq!(tm.params().param, 0.3);
    let out = tm.process(uniform_frame(2, 2, [0.5, 0.5, 0.5])).unwrap();
    for v in out.red.iter().chain(out.green.iter()).chain(out.blue.iter()) {
        assert!(v.is_finite(), "non-finite output {v}");
    }
}

#[test]
fn test_alpha_synthesized_for_alpha_output() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0)
        .with_output_format(PixelFormat::Gbrapf32)
        .unwrap();
    let out = tm.process(gradient_frame(7, 5)).unwrap();
    assert_eq!(out.format, PixelFormat::Gbrapf32);
    let alpha = out.alpha.expect("alpha plane");
    assert_eq!(alpha.dim(), (7, 5));
    assert!(alpha.iter().all(|&a| a == 1.0));
}

#[test]
fn test_unspecified_color_space_disables_desat() {
    let tm = tonemapper(Algorithm::Hable, None, 10.0, 2.0);
    let mut input = uniform_frame(2, 2, [8.0, 1.0, 0.5]);
    input.metadata.color_space = ColorSpace::Unspecified;

    let ctx = tm.resolve_frame(&input).unwrap();
    assert_eq!(ctx.desat, 0.0);
    assert!(ctx.coefficients.is_none());
    assert_eq!(tm.params().desat, 2.0);

    let out = tm.process(input).unwrap();
    let reference = tonemapper(Algorithm::Hable, None, 10.0, 0.0)
        .process(uniform_frame(2, 2, [8.0, 1.0, 0.5]))
        .unwrap();
    assert_eq!(out.rgb(0, 0), reference.rgb(0, 0));

    let desaturated = tm.process(uniform_frame(2, 2, [8.0, 1.0, 0.5])).unwrap();
    assert_ne!(desaturated.rgb(0, 0), reference.rgb(0, 0));
}

#[test]
fn test_unsupported_color_space_disables_desat() {
    let tm = tonemapper(Algorithm::Reinhard, None, 10.0, 2.0);
    let mut input = uniform_frame(1, 1, [8.0, 1.0, 0.5]);
    input.metadata.color_space = ColorSpace::Ycgco;
    assert_eq!(tm.resolve_frame(&input).unwrap().desat, 0.0);
}

#[test]
fn test_desat_fallback_does_not_leak_into_next_frame() {
    let tm = tonemapper(Algorithm::Hable, None, 10.0, 2.0);
    let mut first = uniform_frame(2, 2, [8.0, 1.0, 0.5]);
    first.metadata.color_space = ColorSpace::Unspecified;
    tm.process(first).unwrap();

    let second = uniform_frame(2, 2, [8.0, 1.0, 0.5]);
    let ctx = tm.resolve_frame(&second).unwrap();
    assert_eq!(ctx.desat, 2.0);
    assert!(ctx.coefficients.is_some());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_identity_preserves_all_planes() {
    let tm = tonemapper(Algorithm::None, None, 0.0, 0.0);
    let input = gradient_frame_rgba(9, 6);
    let expected = input.clone();
    let out = tm.process(input).unwrap();
    assert_eq!(out.red, expected.red);
    assert_eq!(out.green, expected.green);
    assert_eq!(out.blue, expected.blue);
    assert_eq!(out.alpha, expected.alpha);
}

#[test]
fn test_hue_preserved_without_desat() {
    for algorithm in Algorithm::ALL {
        let tm = tonemapper(algorithm, None, 10.0, 0.0);
        let input = gradient_frame(6, 6);
        let expected = input.clone();
        let out = tm.process(input).unwrap();
        for row in 0..6 {
            for col in 0..6 {
                let [r, g, b] = expected.rgb(row, col);
                let [or, og, ob] = out.rgb(row, col);
                if or == 0.0 {
                    continue;
                }
                let scale = or / r;
                assert_abs_diff_eq!(og, g * scale, epsilon = 1e-4 * g.max(1.0));
                assert_abs_diff_eq!(ob, b * scale, epsilon = 1e-4 * b.max(1.0));
            }
        }
    }
}

#[test]
fn test_deterministic_across_worker_counts() {
    let reference = tonemapper(Algorithm::Mobius, Some(0.4), 0.0, 1.0)
        .with_workers(1)
        .process(gradient_frame(31, 17))
        .unwrap();
    for workers in [2, 5, 8, 64] {
        let out = tonemapper(Algorithm::Mobius, Some(0.4), 0.0, 1.0)
            .with_workers(workers)
            .process(gradient_frame(31, 17))
            .unwrap();
        assert_eq!(out.red, reference.red, "workers={workers}");
        assert_eq!(out.green, reference.green, "workers={workers}");
        assert_eq!(out.blue, reference.blue, "workers={workers}");
    }
}

#[test]
fn test_output_dimensions_match_input() {
    let tm = tonemapper(Algorithm::Gamma, None, 0.0, 2.0);
    let out = tm.process(gradient_frame(13, 29)).unwrap();
    assert_eq!((out.height(), out.width()), (13, 29));
    assert_eq!(out.format, PixelFormat::Gbrpf32);
}

#[test]
fn test_alpha_dropped_for_rgb_output() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 0.0)
        .with_output_format(PixelFormat::Gbrpf32)
        .unwrap();
    let input = gradient_frame_rgba(4, 4);
    let expected = tonemapper(Algorithm::Hable, None, 0.0, 0.0)
        .process(gradient_frame(4, 4))
        .unwrap();
    let out = tm.process(input).unwrap();
    assert!(out.alpha.is_none());
    assert_planes_close(&out.red, &expected.red, 0.0);
}

// ---------------------------------------------------------------------------
// Worker count and diagnostics
// ---------------------------------------------------------------------------

#[test]
fn test_workers_follow_override() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    assert_eq!(tm.workers(), rayon::current_num_threads().max(1));
    assert_eq!(tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_workers(3).workers(), 3);
    assert_eq!(tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_workers(0).workers(), 1);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn count(&self, needle: &str) -> usize {
        String::from_utf8_lossy(&self.0.lock().unwrap()).matches(needle).count()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture_logs(f: impl FnOnce()) -> LogBuffer {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer
}

#[test]
fn test_describe_frame_matches_resolve_frame() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut input = with_content_light(gradient_frame(2, 2), 400);
    input.metadata.color_space = ColorSpace::Unspecified;
    assert_eq!(
        tm.describe_frame(&input).unwrap(),
        tm.resolve_frame(&input).unwrap()
    );
}

#[test]
fn test_describe_then_process_warns_once() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut input = gradient_frame(2, 2);
    input.metadata.color_space = ColorSpace::Unspecified;

    let logs = capture_logs(|| {
        let ctx = tm.describe_frame(&input).unwrap();
        assert_eq!(ctx.desat, 0.0);
        tm.process(input).unwrap();
    });
    assert_eq!(logs.count("desaturation is disabled"), 1);
    assert_eq!(logs.count("Computed signal peak"), 1);
}

#[test]
fn test_resolve_frame_logs_degraded_color_space() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut input = gradient_frame(2, 2);
    input.metadata.color_space = ColorSpace::Ycgco;
    let logs = capture_logs(|| {
        tm.resolve_frame(&input).unwrap();
    });
    assert_eq!(logs.count("Unsupported color space"), 1);
}

// ---------------------------------------------------------------------------
// Peak resolution and HDR side data
// ---------------------------------------------------------------------------

#[test]
fn test_peak_override_wins() {
    let tm = tonemapper(Algorithm::Hable, None, 6.0, 2.0);
    let input = with_content_light(gradient_frame(2, 2), 1000);
    assert_eq!(tm.resolve_frame(&input).unwrap().peak, 6.0);
}

#[test]
fn test_peak_from_content_light() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let input = with_content_light(gradient_frame(2, 2), 1000);
    assert_eq!(tm.resolve_frame(&input).unwrap().peak, 10.0);
}

#[test]
fn test_peak_from_mastering_when_cll_zero() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let input = with_mastering_peak(with_content_light(gradient_frame(2, 2), 0), 4000.0);
    assert_eq!(tm.resolve_frame(&input).unwrap().peak, 40.0);
}

#[test]
fn test_peak_fallbacks_by_transfer() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut pq = gradient_frame(2, 2);
    pq.metadata.color_trc = TransferCharacteristic::Smpte2084;
    assert_eq!(tm.resolve_frame(&pq).unwrap().peak, 100.0);
    assert_eq!(tm.resolve_frame(&gradient_frame(2, 2)).unwrap().peak, 10.0);
}

#[test]
fn test_custom_peak_estimator() {
    let services = Services {
        peak: Arc::new(FixedPeak(5.0)),
        ..Services::default()
    };
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_services(services);
    assert_eq!(tm.resolve_frame(&gradient_frame(2, 2)).unwrap().peak, 5.0);
}

#[test]
fn test_non_positive_estimated_peak_is_internal_error() {
    let services = Services {
        peak: Arc::new(FixedPeak(0.0)),
        ..Services::default()
    };
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_services(services);
    let err = tm.process(gradient_frame(2, 2)).unwrap_err();
    assert!(matches!(err, TonemapError::Internal(_)), "{err}");
}

#[test]
fn test_hdr_side_data_rewritten() {
    let tm = tonemapper(Algorithm::Mobius, None, 4.0, 2.0);
    let input = with_mastering_peak(with_content_light(gradient_frame(2, 2), 1000), 1000.0);
    let out = tm.process(input).unwrap();
    assert_eq!(out.metadata.content_light.unwrap().max_cll, 400);
    assert_eq!(out.metadata.content_light.unwrap().max_fall, 250);
    let md = out.metadata.mastering_display.unwrap();
    assert_eq!(md.max_luminance, Some(400.0));
    assert_eq!(md.min_luminance, Some(0.005));
}

#[test]
fn test_hdr_side_data_absent_stays_absent() {
    let tm = tonemapper(Algorithm::Mobius, None, 4.0, 2.0);
    let out = tm.process(gradient_frame(2, 2)).unwrap();
    assert!(out.metadata.content_light.is_none());
    assert!(out.metadata.mastering_display.is_none());
}

// ---------------------------------------------------------------------------
// Metadata and transfer tags
// ---------------------------------------------------------------------------

#[test]
fn test_metadata_copied_to_output() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut input = gradient_frame(2, 2);
    input.metadata.pts = Some(42);
    input.metadata.color_space = ColorSpace::Bt2020Ncl;
    let out = tm.process(input).unwrap();
    assert_eq!(out.metadata.pts, Some(42));
    assert_eq!(out.metadata.color_space, ColorSpace::Bt2020Ncl);
    assert_eq!(out.metadata.color_trc, TransferCharacteristic::Linear);
}

#[test]
fn test_untagged_transfer_tagged_linear() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut input = gradient_frame(2, 2);
    input.metadata.color_trc = TransferCharacteristic::Unspecified;
    let out = tm.process(input).unwrap();
    assert_eq!(out.metadata.color_trc, TransferCharacteristic::Linear);
}

#[test]
fn test_non_linear_transfer_still_processed() {
    let tm = tonemapper(Algorithm::Clip, Some(1.0), 0.0, 0.0);
    let mut input = uniform_frame(2, 2, [2.0, 2.0, 2.0]);
    input.metadata.color_trc = TransferCharacteristic::Smpte2084;
    let out = tm.process(input).unwrap();
    assert_eq!(out.metadata.color_trc, TransferCharacteristic::Smpte2084);
    assert_eq!(out.rgb(0, 0), [1.0, 1.0, 1.0]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_allocation_failure_is_out_of_memory() {
    let services = Services {
        allocator: Arc::new(FailingAllocator),
        ..Services::default()
    };
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_services(services);
    let err = tm.process(gradient_frame(3, 4)).unwrap_err();
    assert!(
        matches!(err, TonemapError::OutOfMemory { width: 4, height: 3 }),
        "{err}"
    );
}

#[test]
fn test_metadata_copy_failure_propagates() {
    let services = Services {
        metadata: Arc::new(FailingCopier),
        ..Services::default()
    };
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_services(services);
    let err = tm.process(gradient_frame(2, 2)).unwrap_err();
    assert!(matches!(err, TonemapError::Metadata(_)), "{err}");
}

#[test]
fn test_unresolvable_format_is_internal_error() {
    let services = Services {
        formats: Arc::new(NoFormats),
        ..Services::default()
    };
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_services(services);
    let err = tm.process(gradient_frame(2, 2)).unwrap_err();
    assert!(matches!(err, TonemapError::Internal(_)), "{err}");
}

#[test]
fn test_unsupported_input_format_rejected() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut input = gradient_frame(2, 2);
    input.format = PixelFormat::Rgbf32;
    let err = tm.process(input).unwrap_err();
    assert!(matches!(err, TonemapError::UnsupportedFormat(_)), "{err}");
}

#[test]
fn test_unsupported_output_format_rejected() {
    let result = tonemapper(Algorithm::Hable, None, 0.0, 2.0).with_output_format(PixelFormat::Gbrp16);
    assert!(matches!(result, Err(TonemapError::UnsupportedFormat(_))));
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

fn numbered_frames(count: usize) -> Vec<Result<Frame>> {
    (0..count)
        .map(|i| {
            let mut frame = gradient_frame(4, 3);
            frame.metadata.pts = Some(i as i64);
            Ok(frame)
        })
        .collect()
}

#[derive(Default)]
struct RecordingReporter {
    total: Mutex<Option<Option<usize>>>,
    advances: AtomicUsize,
    finished: AtomicUsize,
}

impl ProgressReporter for RecordingReporter {
    fn begin(&self, total_frames: Option<usize>) {
        *self.total.lock().unwrap() = Some(total_frames);
    }

    fn advance(&self, _frames_done: usize) {
        self.advances.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_filter_frame_pushes_to_sink() {
    let tm = tonemapper(Algorithm::Reinhard, Some(0.5), 0.0, 2.0);
    let mut sink: Vec<Frame> = Vec::new();
    tm.filter_frame(gradient_frame(3, 3), &mut sink).unwrap();
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_run_stream_preserves_order() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut sink: Vec<Frame> = Vec::new();
    let reporter = RecordingReporter::default();
    let done = tm.run_stream(numbered_frames(5), &mut sink, &reporter).unwrap();

    assert_eq!(done, 5);
    let pts: Vec<Option<i64>> = sink.iter().map(|f| f.metadata.pts).collect();
    assert_eq!(pts, [Some(0), Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(*reporter.total.lock().unwrap(), Some(Some(5)));
    assert_eq!(reporter.advances.load(Ordering::SeqCst), 5);
    assert_eq!(reporter.finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_run_stream_stops_at_source_error() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut frames = numbered_frames(3);
    frames[1] = Err(TonemapError::InvalidRawStream("truncated".into()));
    let mut sink: Vec<Frame> = Vec::new();
    let err = tm.run_stream(frames, &mut sink, &NoOpReporter).unwrap_err();
    assert!(matches!(err, TonemapError::InvalidRawStream(_)));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_run_stream_propagates_sink_error() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut sink = BoundedSink {
        frames: Vec::new(),
        capacity: 2,
    };
    let err = tm
        .run_stream(numbered_frames(4), &mut sink, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, TonemapError::Sink(_)));
    assert_eq!(sink.frames.len(), 2);
}

#[test]
fn test_run_stream_empty_source() {
    let tm = tonemapper(Algorithm::Hable, None, 0.0, 2.0);
    let mut sink: Vec<Frame> = Vec::new();
    let done = tm
        .run_stream(Vec::<Result<Frame>>::new(), &mut sink, &NoOpReporter)
        .unwrap();
    assert_eq!(done, 0);
    assert!(sink.is_empty());
}

#[test]
fn test_frame_sink_trait_object() {
    let tm = tonemapper(Algorithm::Linear, None, 2.0, 0.0);
    let mut frames: Vec<Frame> = Vec::new();
    {
        let sink: &mut dyn FrameSink = &mut frames;
        tm.filter_frame(uniform_frame(1, 1, [2.0, 2.0, 2.0]), sink).unwrap();
    }
    assert_abs_diff_eq!(frames[0].red[[0, 0]], 1.0, epsilon = 1e-6);
}
