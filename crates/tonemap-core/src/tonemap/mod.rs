pub mod curve;
pub mod pixel;

pub use curve::{map_signal, Algorithm, ToneCurve};
pub use pixel::PixelMapper;
