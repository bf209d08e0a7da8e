//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the library:
//! - Math types and operations
//! - Frame timing
//! - Logging setup and the fatal sink
//! - Text file loading

pub mod io;
pub mod logging;
pub mod math;
pub mod time;
