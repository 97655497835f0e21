//! Meter correction math utilities.

pub mod math;

pub use math::regression::*;
pub use math::rounding::*;
