//! Core math modules.

pub mod regression;
pub mod rounding;
