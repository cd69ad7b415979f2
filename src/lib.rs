pub mod config;
pub mod error;
pub mod format;
pub mod journal;
pub mod models;
pub mod pricing;
pub mod report;
pub mod series;
pub mod session;

pub use error::{Error, Result};
