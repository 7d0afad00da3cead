pub mod config;
pub mod error;
pub mod render;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
