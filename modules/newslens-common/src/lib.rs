pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, IntelligenceProvider};
pub use error::NewsLensError;
pub use types::*;
