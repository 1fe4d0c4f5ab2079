use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tonemap_core::format::PixelFormat;
use tonemap_core::frame::ColorSpace;
use tonemap_core::io::image_io::{load_frame, save_frame};
use tonemap_core::pipeline::slice::job_count;
use tonemap_core::pipeline::Tonemapper;

use super::args::{MetadataArgs, ToneMapArgs};
use crate::summary::print_tonemap_summary;

#[derive(Args)]
pub struct ApplyArgs {
    /// Input image (EXR, HDR, TIFF or PNG)
    pub file: PathBuf,

    #[command(flatten)]
    pub tonemap: ToneMapArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Always write an alpha channel (opaque if the input has none)
    #[arg(long, conflicts_with = "drop_alpha")]
    pub alpha: bool,

    /// Never write an alpha channel
    #[arg(long)]
    pub drop_alpha: bool,

    /// Output file path (.exr keeps values above 1.0)
    #[arg(short, long, default_value = "tonemapped.tiff")]
    pub output: PathBuf,
}

pub fn run(args: &ApplyArgs) -> Result<()> {
    let config = args.tonemap.build_config()?;

    let mut frame = load_frame(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    // Decoded stills carry no matrix tag; assume BT.709 unless told otherwise.
    frame.metadata.color_space = ColorSpace::Bt709;
    args.metadata.apply_to(&mut frame.metadata);

    let mut tonemapper = Tonemapper::new(config)?;
    if let Some(jobs) = args.tonemap.jobs {
        tonemapper = tonemapper.with_workers(jobs);
    }
    if args.alpha {
        tonemapper = tonemapper.with_output_format(PixelFormat::Gbrapf32)?;
    } else if args.drop_alpha {
        tonemapper = tonemapper.with_output_format(PixelFormat::Gbrpf32)?;
    }

    let ctx = tonemapper.describe_frame(&frame)?;
    let bands = job_count(frame.height(), tonemapper.workers());
    print_tonemap_summary(
        tonemapper.params(),
        &ctx,
        bands,
        &frame.metadata,
        &args.file,
        &args.output,
    );

    let output = tonemapper.process(frame)?;
    save_frame(&output, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    println!("Output saved to {}", args.output.display());
    Ok(())
}
