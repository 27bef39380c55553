//! tierio Common - Shared types and utilities
//!
//! This crate provides the error taxonomy, client configuration and the
//! storage node descriptor used across all tierio components.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ClientConfig, WaitBound};
pub use error::{Error, Result};
pub use types::*;
