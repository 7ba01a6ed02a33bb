pub mod analysis;
pub mod config;
pub mod error;
pub mod log;
pub mod report;

pub use config::{Config, ConfigKey};
pub use error::{Error, Result};
