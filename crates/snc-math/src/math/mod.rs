//! Core math modules.

pub mod mgf;
pub mod stable;
