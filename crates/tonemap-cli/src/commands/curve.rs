use anyhow::Result;
use clap::Args;
use tonemap_core::pipeline::ToneMapConfig;
use tonemap_core::tonemap::ToneCurve;

use super::args::AlgorithmArg;

#[derive(Args)]
pub struct CurveArgs {
    /// Tone curve
    #[arg(value_enum)]
    pub algorithm: AlgorithmArg,

    /// Curve parameter (algorithm default if omitted)
    #[arg(short, long)]
    pub param: Option<f64>,

    /// Signal peak relative to reference white
    #[arg(long, default_value = "10.0")]
    pub peak: f64,

    /// Number of sample points between 0 and peak
    #[arg(short, long, default_value = "11")]
    pub steps: usize,
}

/// Tabulate a curve: input signal, mapped signal, and the channel scale.
pub fn run(args: &CurveArgs) -> Result<()> {
    let config = ToneMapConfig {
        algorithm: args.algorithm.into(),
        param: args.param,
        peak: args.peak,
        ..ToneMapConfig::default()
    };
    config.validate()?;
    if config.peak == 0.0 {
        anyhow::bail!("Peak must be greater than 0");
    }
    let params = config.initialize();
    let curve = ToneCurve::new(params.algorithm, params.param, params.peak);

    println!(
        "{} (param {:.4}, peak {:.2})",
        params.algorithm, params.param, params.peak
    );
    println!("{:>12}  {:>12}  {:>10}", "signal", "mapped", "scale");

    let steps = args.steps.max(2);
    for i in 0..steps {
        let signal = (params.peak * i as f64 / (steps - 1) as f64) as f32;
        let mapped = curve.apply(signal);
        if signal > 0.0 {
            println!("{:>12.5}  {:>12.5}  {:>10.5}", signal, mapped, mapped / signal);
        } else {
            println!("{:>12.5}  {:>12.5}  {:>10}", signal, mapped, "-");
        }
    }

    Ok(())
}
