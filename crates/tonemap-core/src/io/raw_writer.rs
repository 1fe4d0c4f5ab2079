use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use ndarray::Array2;

use crate::error::{Result, TonemapError};
use crate::frame::Frame;
use crate::io::raw::{Plane, RawLayout, PLANE_ORDER};
use crate::pipeline::FrameSink;

/// Writes frames as headerless planar float video, the inverse of
/// `RawStreamReader`.
///
/// The first frame fixes the layout; later frames must match it.
pub struct RawStreamWriter {
    writer: BufWriter<File>,
    layout: Option<RawLayout>,
    frames_written: usize,
}

impl RawStreamWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            layout: None,
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let layout = RawLayout::new(frame.width(), frame.height(), frame.format)?;
        match self.layout {
            None => self.layout = Some(layout),
            Some(expected) if expected != layout => {
                return Err(TonemapError::InvalidRawStream(format!(
                    "frame {} is {}x{} {}, stream is {}x{} {}",
                    self.frames_written,
                    layout.width,
                    layout.height,
                    layout.format,
                    expected.width,
                    expected.height,
                    expected.format
                )));
            }
            Some(_) => {}
        }

        for plane in PLANE_ORDER {
            let data = match plane {
                Plane::Green => &frame.green,
                Plane::Blue => &frame.blue,
                Plane::Red => &frame.red,
                Plane::Alpha => match frame.alpha.as_ref() {
                    Some(alpha) => alpha,
                    None => continue,
                },
            };
            write_plane(&mut self.writer, data)?;
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and close the file.
    pub fn finalize(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn write_plane(w: &mut impl Write, plane: &Array2<f32>) -> Result<()> {
    for &v in plane.iter() {
        w.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

impl FrameSink for RawStreamWriter {
    fn push(&mut self, frame: Frame) -> Result<()> {
        self.write_frame(&frame)
    }
}
