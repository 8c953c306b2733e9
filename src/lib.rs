pub mod config;
pub mod core;
pub mod error;

pub use crate::error::{Error, Result};
