//! Numeric primitives for stochastic network calculus.

pub mod math;

pub use math::mgf::*;
pub use math::stable::*;
