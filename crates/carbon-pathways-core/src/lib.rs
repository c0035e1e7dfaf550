//! Scenario trajectory and marginal abatement cost engine for corporate
//! greenhouse-gas accounting.
//!
//! Every computation is a pure function of its inputs: reference tables,
//! activity data and scenario definitions come in as parameters, results
//! come back as values. Nothing is cached or mutated between calls.

pub mod config;
pub mod error;
pub mod inventory;
pub mod scenarios;
pub mod time_value;
pub mod trajectory;
pub mod types;

#[cfg(feature = "macc")]
pub mod macc;

#[cfg(feature = "payoff")]
pub mod payoff;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::PathwayError;
pub use types::*;

/// Standard result type for all carbon-pathways operations
pub type PathwayResult<T> = Result<T, PathwayError>;
