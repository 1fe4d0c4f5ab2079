use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use ndarray::Array2;

use crate::error::{Result, TonemapError};
use crate::frame::{Frame, TransferCharacteristic};

/// Load a still image as a planar float frame.
///
/// OpenEXR and Radiance HDR files are tagged as linear light. Integer
/// formats (PNG, TIFF, ...) are normalized to [0, 1] and tagged sRGB; they
/// are not linearized.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let mut frame = frame_from_image(&img)?;
    frame.metadata.color_trc = match path.extension().and_then(|e| e.to_str()) {
        Some("exr" | "hdr") => TransferCharacteristic::Linear,
        _ => TransferCharacteristic::Iec61966_2_1,
    };
    Ok(frame)
}

/// Convert a decoded image into planar float, keeping alpha if present.
pub fn frame_from_image(img: &DynamicImage) -> Result<Frame> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let mut red = Array2::<f32>::zeros((h, w));
    let mut green = Array2::<f32>::zeros((h, w));
    let mut blue = Array2::<f32>::zeros((h, w));

    if img.color().has_alpha() {
        let rgba = img.to_rgba32f();
        let mut alpha = Array2::<f32>::zeros((h, w));
        for (col, row, px) in rgba.enumerate_pixels() {
            let (row, col) = (row as usize, col as usize);
            red[[row, col]] = px.0[0];
            green[[row, col]] = px.0[1];
            blue[[row, col]] = px.0[2];
            alpha[[row, col]] = px.0[3];
        }
        Frame::from_planes(red, green, blue, Some(alpha))
    } else {
        let rgb = img.to_rgb32f();
        for (col, row, px) in rgb.enumerate_pixels() {
            let (row, col) = (row as usize, col as usize);
            red[[row, col]] = px.0[0];
            green[[row, col]] = px.0[1];
            blue[[row, col]] = px.0[2];
        }
        Frame::from_planes(red, green, blue, None)
    }
}

fn interleave<T>(frame: &Frame, with_alpha: bool, convert: impl Fn(f32) -> T) -> Vec<T> {
    let (h, w) = (frame.height(), frame.width());
    let channels = if with_alpha { 4 } else { 3 };
    let mut pixels = Vec::with_capacity(h * w * channels);
    for row in 0..h {
        for col in 0..w {
            pixels.push(convert(frame.red[[row, col]]));
            pixels.push(convert(frame.green[[row, col]]));
            pixels.push(convert(frame.blue[[row, col]]));
            if let (true, Some(alpha)) = (with_alpha, frame.alpha.as_ref()) {
                pixels.push(convert(alpha[[row, col]]));
            }
        }
    }
    pixels
}

fn buffer_size_error() -> TonemapError {
    TonemapError::Internal("image buffer size does not match frame dimensions".into())
}

/// Save as 32-bit float OpenEXR, keeping values above 1.0.
pub fn save_exr(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    if frame.alpha.is_some() {
        let pixels = interleave(frame, true, |v| v);
        ImageBuffer::<Rgba<f32>, Vec<f32>>::from_raw(w, h, pixels)
            .ok_or_else(buffer_size_error)?
            .save(path)?;
    } else {
        let pixels = interleave(frame, false, |v| v);
        ImageBuffer::<Rgb<f32>, Vec<f32>>::from_raw(w, h, pixels)
            .ok_or_else(buffer_size_error)?
            .save(path)?;
    }
    Ok(())
}

/// Save as 16-bit TIFF, clamping to [0, 1].
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let to_u16 = |v: f32| (v.clamp(0.0, 1.0) * 65535.0) as u16;
    if frame.alpha.is_some() {
        let pixels = interleave(frame, true, to_u16);
        ImageBuffer::<Rgba<u16>, Vec<u16>>::from_raw(w, h, pixels)
            .ok_or_else(buffer_size_error)?
            .save(path)?;
    } else {
        let pixels = interleave(frame, false, to_u16);
        ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w, h, pixels)
            .ok_or_else(buffer_size_error)?
            .save(path)?;
    }
    Ok(())
}

/// Save as 8-bit PNG, clamping to [0, 1].
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    if frame.alpha.is_some() {
        let pixels = interleave(frame, true, to_u8);
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(w, h, pixels)
            .ok_or_else(buffer_size_error)?
            .save(path)?;
    } else {
        let pixels = interleave(frame, false, to_u8);
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w, h, pixels)
            .ok_or_else(buffer_size_error)?
            .save(path)?;
    }
    Ok(())
}

/// Save a frame, choosing format from file extension.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("exr") => save_exr(frame, path),
        Some("png") => save_png(frame, path),
        Some("tiff" | "tif") => save_tiff(frame, path),
        _ => save_tiff(frame, path),
    }
}
