//! Stochastic network calculus bounds.
//!
//! This library provides:
//! - Arrival and service processes with a (σ, ρ) description
//! - Composition operators: convolution, leftover service, deconvolution
//! - Stationary and time-indexed single-hop bounds
//! - Black-box optimizers over θ and the Lyapunov exponent
//! - Topologies reduced to a single hop and a strategy comparison harness
//!
//! The binary entry point is in `main.rs`.

pub mod analysis;
pub mod bounds;
pub mod compare;
pub mod exit_codes;
pub mod experimental;
pub mod logging;
pub mod lyapunov;
pub mod operations;
pub mod optimizer;
pub mod process;
pub mod topology;

pub use lyapunov::Lyapunov;
pub use process::{Arrival, Process, Service, SharedArrival, SharedService};
pub use topology::Setting;
