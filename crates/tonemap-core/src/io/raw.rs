use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{Result, TonemapError};
use crate::format::{PixelFormat, PixelFormatDescriptor};
use crate::frame::{Frame, FrameMetadata};

/// Plane order of planar GBR layouts as stored on disk.
pub(crate) const PLANE_ORDER: [Plane; 4] = [Plane::Green, Plane::Blue, Plane::Red, Plane::Alpha];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Plane {
    Green,
    Blue,
    Red,
    Alpha,
}

/// Geometry of a headerless planar float stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawLayout {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl RawLayout {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TonemapError::InvalidDimensions { width, height });
        }
        let layout = Self {
            width,
            height,
            format,
        };
        layout.descriptor()?;
        Ok(layout)
    }

    pub(crate) fn descriptor(&self) -> Result<PixelFormatDescriptor> {
        PixelFormatDescriptor::planar_float(self.format)
            .ok_or_else(|| TonemapError::UnsupportedFormat(self.format.to_string()))
    }

    /// Bytes in one plane.
    pub fn plane_byte_size(&self) -> usize {
        self.width * self.height * std::mem::size_of::<f32>()
    }

    /// Bytes in one frame (all planes).
    pub fn frame_byte_size(&self) -> Result<usize> {
        self.descriptor()?
            .frame_byte_size(self.width, self.height)
            .ok_or(TonemapError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
    }
}

/// Memory-mapped reader for raw `gbrpf32le` / `gbrapf32le` video.
///
/// Frames are stored back to back with no header; each frame is its G, B,
/// R (and A) planes in that order, little-endian.
pub struct RawStreamReader {
    mmap: Mmap,
    layout: RawLayout,
    frame_bytes: usize,
    template: FrameMetadata,
}

impl RawStreamReader {
    pub fn open(path: &Path, layout: RawLayout) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let frame_bytes = layout.frame_byte_size()?;

        if mmap.len() % frame_bytes != 0 {
            return Err(TonemapError::InvalidRawStream(format!(
                "size {} is not a multiple of the {}-byte frame size for {}x{} {}",
                mmap.len(),
                frame_bytes,
                layout.width,
                layout.height,
                layout.format
            )));
        }

        Ok(Self {
            mmap,
            layout,
            frame_bytes,
            template: FrameMetadata::default(),
        })
    }

    /// Metadata stamped onto every frame read (the timestamp is overwritten
    /// with the frame index).
    pub fn with_metadata(mut self, metadata: FrameMetadata) -> Self {
        self.template = metadata;
        self
    }

    pub fn layout(&self) -> RawLayout {
        self.layout
    }

    pub fn frame_count(&self) -> usize {
        self.mmap.len() / self.frame_bytes
    }

    /// Raw bytes of one frame (zero-copy from the map).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(TonemapError::FrameIndexOutOfRange {
                index,
                total: count,
            });
        }
        let offset = index * self.frame_bytes;
        Ok(&self.mmap[offset..offset + self.frame_bytes])
    }

    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index)?;
        let RawLayout { width, height, .. } = self.layout;
        let plane_bytes = self.layout.plane_byte_size();
        let has_alpha = self.layout.format.has_alpha();

        let mut red = None;
        let mut green = None;
        let mut blue = None;
        let mut alpha = None;
        for (i, chunk) in raw.chunks_exact(plane_bytes).enumerate() {
            let data = decode_plane(chunk, width, height)?;
            match PLANE_ORDER[i] {
                Plane::Green => green = Some(data),
                Plane::Blue => blue = Some(data),
                Plane::Red => red = Some(data),
                Plane::Alpha if has_alpha => alpha = Some(data),
                Plane::Alpha => {}
            }
        }

        let missing = || TonemapError::InvalidRawStream(format!("frame {index} is missing planes"));
        let mut frame = Frame::from_planes(
            red.ok_or_else(missing)?,
            green.ok_or_else(missing)?,
            blue.ok_or_else(missing)?,
            alpha,
        )?;
        frame.metadata = self.template.clone();
        frame.metadata.pts = Some(index as i64);
        Ok(frame)
    }

    /// Iterator over all frames in stream order.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = Result<Frame>> + '_ {
        (0..self.frame_count()).map(move |i| self.read_frame(i))
    }
}

fn decode_plane(bytes: &[u8], width: usize, height: usize) -> Result<Array2<f32>> {
    let mut samples = vec![0.0f32; width * height];
    LittleEndian::read_f32_into(bytes, &mut samples);
    Array2::from_shape_vec((height, width), samples)
        .map_err(|e| TonemapError::InvalidRawStream(format!("plane shape: {e}")))
}
