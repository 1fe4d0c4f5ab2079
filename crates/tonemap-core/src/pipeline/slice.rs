use std::ops::Range;

use ndarray::{s, Array2, ArrayViewMut2, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::consts::OPAQUE_ALPHA;
use crate::error::{Result, TonemapError};
use crate::format::PixelFormatDescriptor;
use crate::frame::Frame;
use crate::tonemap::PixelMapper;

/// Number of bands for a frame: one per worker, never more than one per row.
pub fn job_count(height: usize, workers: usize) -> usize {
    height.min(workers.max(1))
}

/// Rows covered by band `index` of `jobs`: `[h*i/n, h*(i+1)/n)`.
pub fn band_rows(height: usize, jobs: usize, index: usize) -> Range<usize> {
    let h = height as u128;
    let n = jobs.max(1) as u128;
    let start = h * index as u128 / n;
    let end = h * (index as u128 + 1) / n;
    start as usize..end as usize
}

/// Split `[0, height)` into `jobs` contiguous, disjoint row ranges.
pub fn partition_rows(height: usize, jobs: usize) -> Vec<Range<usize>> {
    let jobs = jobs.max(1);
    (0..jobs).map(|i| band_rows(height, jobs, i)).collect()
}

/// Read-only state shared by every band of one frame.
pub struct SliceTask<'a> {
    pub input: &'a Frame,
    pub input_desc: PixelFormatDescriptor,
    pub output_desc: PixelFormatDescriptor,
    pub mapper: PixelMapper,
}

/// Exclusive output rows of one band, across all planes.
struct Band<'a> {
    rows: Range<usize>,
    red: ArrayViewMut2<'a, f32>,
    green: ArrayViewMut2<'a, f32>,
    blue: ArrayViewMut2<'a, f32>,
    alpha: Option<ArrayViewMut2<'a, f32>>,
}

fn split_bands<'a>(
    plane: &'a mut Array2<f32>,
    bands: &[Range<usize>],
) -> Vec<ArrayViewMut2<'a, f32>> {
    let mut views = Vec::with_capacity(bands.len());
    let mut rest = plane.view_mut();
    let mut consumed = 0;
    for rows in bands {
        let (head, tail) = rest.split_at(Axis(0), rows.end - consumed);
        views.push(head);
        rest = tail;
        consumed = rows.end;
    }
    views
}

fn check_shape(plane: &Array2<f32>, expected: (usize, usize)) -> Result<()> {
    if plane.dim() == expected {
        Ok(())
    } else {
        Err(TonemapError::PlaneMismatch {
            expected,
            actual: plane.dim(),
        })
    }
}

/// Tone-map `task.input` into `output`, fanning rows out over `jobs` bands.
///
/// Output planes must match the input's dimensions. Bands run on the
/// current rayon pool; the result does not depend on `jobs`.
pub fn execute(task: &SliceTask<'_>, output: &mut Frame, jobs: usize) -> Result<()> {
    let input = task.input;
    let dim = output.red.dim();
    for plane in [&input.red, &input.green, &input.blue, &output.green, &output.blue] {
        check_shape(plane, dim)?;
    }
    let copy_alpha = task.input_desc.has_alpha && task.output_desc.has_alpha;
    if copy_alpha {
        let src = input.alpha.as_ref().ok_or_else(|| {
            TonemapError::Internal("input format has alpha but frame has no alpha plane".into())
        })?;
        check_shape(src, dim)?;
    }
    if task.output_desc.has_alpha {
        match output.alpha.as_ref() {
            Some(plane) => check_shape(plane, dim)?,
            None => {
                return Err(TonemapError::Internal(
                    "output format has alpha but frame has no alpha plane".into(),
                ))
            }
        }
    }

    let height = dim.0;
    if height == 0 {
        return Ok(());
    }
    let bands = partition_rows(height, job_count(height, jobs));
    debug!(bands = bands.len(), height, "Dispatching row bands");

    let reds = split_bands(&mut output.red, &bands);
    let greens = split_bands(&mut output.green, &bands);
    let blues = split_bands(&mut output.blue, &bands);
    let alphas: Vec<Option<ArrayViewMut2<'_, f32>>> = match output.alpha.as_mut() {
        Some(plane) if task.output_desc.has_alpha => {
            split_bands(plane, &bands).into_iter().map(Some).collect()
        }
        _ => bands.iter().map(|_| None).collect(),
    };

    let work: Vec<Band<'_>> = bands
        .into_iter()
        .zip(reds)
        .zip(greens)
        .zip(blues)
        .zip(alphas)
        .map(|((((rows, red), green), blue), alpha)| Band {
            rows,
            red,
            green,
            blue,
            alpha,
        })
        .collect();

    work.into_par_iter().for_each(|band| run_band(task, band, copy_alpha));
    Ok(())
}

fn run_band(task: &SliceTask<'_>, mut band: Band<'_>, copy_alpha: bool) {
    let input = task.input;
    let width = band.red.ncols();

    for (local, row) in band.rows.clone().enumerate() {
        for col in 0..width {
            let [r, g, b] = task.mapper.map(input.rgb(row, col));
            band.red[[local, col]] = r;
            band.green[[local, col]] = g;
            band.blue[[local, col]] = b;
        }
    }

    if let Some(alpha) = band.alpha.as_mut() {
        match input.alpha.as_ref() {
            Some(src) if copy_alpha => alpha.assign(&src.slice(s![band.rows.clone(), ..])),
            _ => alpha.fill(OPAQUE_ALPHA),
        }
    }
}
