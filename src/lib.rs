pub mod aws;
pub mod config;
pub mod error;
pub mod provider;
pub mod provision;
pub mod token;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
