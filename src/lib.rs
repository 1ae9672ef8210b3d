pub mod clients;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod utils;

pub use error::{HemertonError, Result};
