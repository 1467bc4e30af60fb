pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod history;
pub mod manifest;

pub use error::{ReleaseError, Result};
