pub mod config;
mod orchestrator;
pub mod services;
pub mod slice;
mod types;

pub use config::{ToneMapConfig, ToneMapParams};
pub use orchestrator::Tonemapper;
pub use services::{FrameSink, Services};
pub use types::{FrameContext, NoOpReporter, ProgressReporter};
