use std::path::Path;

use console::Style;
use tonemap_core::frame::FrameMetadata;
use tonemap_core::pipeline::{FrameContext, ToneMapParams};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

/// Print the resolved parameters for the first frame before processing.
pub fn print_tonemap_summary(
    params: &ToneMapParams,
    ctx: &FrameContext,
    bands: usize,
    metadata: &FrameMetadata,
    input: &Path,
    output: &Path,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Tone Mapping"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    println!("  {:<14}{}", s.label.apply_to("Output"), s.path.apply_to(output.display()));
    println!(
        "  {:<14}{} {}",
        s.label.apply_to("Bands"),
        s.value.apply_to(bands),
        s.label.apply_to(format!("({} threads)", rayon::current_num_threads()))
    );
    println!();

    println!("  {}", s.header.apply_to("Curve"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Algorithm"),
        s.method.apply_to(params.algorithm)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Param"),
        s.value.apply_to(format!("{:.4}", params.param))
    );
    let peak_source = if params.peak > 0.0 { "override" } else { "metadata" };
    println!(
        "    {:<12}{} {}",
        s.label.apply_to("Peak"),
        s.value.apply_to(format!("{:.2}", ctx.peak)),
        s.label.apply_to(format!("({peak_source})"))
    );
    if ctx.desat > 0.0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Desat"),
            s.value.apply_to(format!("{:.2}", ctx.desat))
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Desat"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Source"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Colorspace"),
        s.value.apply_to(metadata.color_space)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Transfer"),
        s.value.apply_to(metadata.color_trc)
    );
    println!();
}
