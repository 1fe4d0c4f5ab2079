pub mod color;
pub mod consts;
pub mod error;
pub mod format;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod tonemap;
