use thiserror::Error;

#[derive(Error, Debug)]
pub enum TonemapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Out of memory allocating {width}x{height} frame")]
    OutOfMemory { width: usize, height: usize },

    #[error("Frame metadata error: {0}")]
    Metadata(String),

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Plane shape mismatch: expected {expected:?}, got {actual:?}")]
    PlaneMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid raw stream: {0}")]
    InvalidRawStream(String),

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Downstream sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, TonemapError>;
