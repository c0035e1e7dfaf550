pub mod curve;

pub use curve::{bau_growth_factor, calculate_macc, compute_macc, MaccBlock, MaccCurve, MaccInput};
