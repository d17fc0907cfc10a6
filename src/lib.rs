pub mod config;
pub mod error;
pub mod fetch;
pub mod governor;
pub mod harvest;
pub mod records;
pub mod storage;
pub mod utils;

pub use error::{AppError, FetchError, Result};
