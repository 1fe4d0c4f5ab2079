pub mod apply;
pub mod args;
pub mod config;
pub mod curve;
pub mod info;
pub mod stream;
