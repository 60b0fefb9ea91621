pub mod config;
pub mod error;
pub mod types;

pub use config::GenerationConfig;
pub use error::{Result, SynthError};
