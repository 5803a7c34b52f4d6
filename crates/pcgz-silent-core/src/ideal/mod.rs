//! Ideal functionalities.

mod cot;

pub use cot::IdealCot;
