//! Core types and shared functionality for scrapay.
//!
//! This crate provides:
//! - Unified error types and their MCP error codes
//! - Configuration structures with layered loading

pub mod config;
pub mod error;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
