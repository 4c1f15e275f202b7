pub mod config;
pub mod error;
pub mod exclusive_section;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use exclusive_section::ExclusiveSection;
