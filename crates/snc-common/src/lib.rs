//! Shared types for stochastic network calculus bounds.
//!
//! This crate provides foundational types shared across snc-core modules:
//! - The unified error type with stable codes and categories
//! - Performance metrics and validated targets
//! - Lyapunov exponent handling mode
//! - Output format specifications

pub mod error;
pub mod lyapunov;
pub mod output;
pub mod perform;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use lyapunov::LyapunovMode;
pub use output::OutputFormat;
pub use perform::{PerformMetric, PerformParameter};
