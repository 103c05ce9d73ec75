pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod server;
pub mod toolkit;

pub use error::{Error, Result};
