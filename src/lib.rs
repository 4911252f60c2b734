pub mod apiclient;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod provider;
pub mod server;
pub mod validation;

pub use error::AppError;
