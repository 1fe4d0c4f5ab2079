use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tonemap_core::format::PixelFormat;
use tonemap_core::frame::FrameMetadata;
use tonemap_core::io::raw::{RawLayout, RawStreamReader};
use tonemap_core::io::raw_writer::RawStreamWriter;
use tonemap_core::pipeline::slice::job_count;
use tonemap_core::pipeline::{ProgressReporter, Tonemapper};

use super::args::{MetadataArgs, ToneMapArgs};
use crate::summary::print_tonemap_summary;

#[derive(Args)]
pub struct StreamArgs {
    /// Input raw stream of planar little-endian f32 frames (G, B, R[, A])
    pub file: PathBuf,

    /// Frame width in pixels
    #[arg(long)]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long)]
    pub height: usize,

    /// Input frames carry an alpha plane
    #[arg(long)]
    pub alpha: bool,

    #[command(flatten)]
    pub tonemap: ToneMapArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Output raw stream path
    #[arg(short, long, default_value = "tonemapped.raw")]
    pub output: PathBuf,
}

struct BarReporter(ProgressBar);

impl ProgressReporter for BarReporter {
    fn begin(&self, total_frames: Option<usize>) {
        if let Some(total) = total_frames {
            self.0.set_length(total as u64);
        }
    }

    fn advance(&self, frames_done: usize) {
        self.0.set_position(frames_done as u64);
    }

    fn finish(&self) {
        self.0.finish_with_message("Done");
    }
}

pub fn run(args: &StreamArgs) -> Result<()> {
    let config = args.tonemap.build_config()?;
    let format = if args.alpha {
        PixelFormat::Gbrapf32
    } else {
        PixelFormat::Gbrpf32
    };
    let layout = RawLayout::new(args.width, args.height, format)?;

    let mut metadata = FrameMetadata::default();
    args.metadata.apply_to(&mut metadata);
    let reader = RawStreamReader::open(&args.file, layout)
        .with_context(|| format!("Failed to open {}", args.file.display()))?
        .with_metadata(metadata);

    let mut tonemapper = Tonemapper::new(config)?;
    if let Some(jobs) = args.tonemap.jobs {
        tonemapper = tonemapper.with_workers(jobs);
    }

    if reader.frame_count() == 0 {
        println!("No frames in {}", args.file.display());
        return Ok(());
    }
    let first = reader.read_frame(0)?;
    let ctx = tonemapper.describe_frame(&first)?;
    let bands = job_count(first.height(), tonemapper.workers());
    print_tonemap_summary(
        tonemapper.params(),
        &ctx,
        bands,
        &first.metadata,
        &args.file,
        &args.output,
    );
    drop(first);

    let pb = ProgressBar::new(reader.frame_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:12} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Tone mapping");
    let reporter = BarReporter(pb);

    let mut writer = RawStreamWriter::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let done = tonemapper.run_stream(reader.frames(), &mut writer, &reporter)?;
    writer.finalize()?;

    println!("\n{} frame(s) written to {}", done, args.output.display());
    Ok(())
}
