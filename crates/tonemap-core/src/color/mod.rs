pub mod desaturate;
pub mod luma;
