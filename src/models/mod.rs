//! Data models

pub mod detection;
pub mod model_control;

pub use detection::*;
pub use model_control::*;
