use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tonemap_core::io::image_io::load_frame;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let frame = load_frame(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", frame.width(), frame.height());
    println!("Format:      {}", frame.format);
    println!("Transfer:    {}", frame.metadata.color_trc);
    println!("Alpha:       {}", if frame.alpha.is_some() { "yes" } else { "no" });
    println!("Max signal:  {:.4}", frame.max_signal());

    let means = [&frame.red, &frame.green, &frame.blue].map(|p| p.mean().unwrap_or(0.0));
    println!(
        "Mean RGB:    {:.4} / {:.4} / {:.4}",
        means[0], means[1], means[2]
    );

    let over = frame
        .red
        .iter()
        .zip(frame.green.iter())
        .zip(frame.blue.iter())
        .filter(|((r, g), b)| r.max(**g).max(**b) > 1.0)
        .count();
    let total = (frame.width() * frame.height()).max(1);
    println!(
        "Overbright:  {} px ({:.2}%)",
        over,
        over as f64 * 100.0 / total as f64
    );

    Ok(())
}
