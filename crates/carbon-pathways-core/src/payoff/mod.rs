pub mod npv;

pub use npv::{calculate_payoff, compute_payoff, PayoffInput, PayoffPoint};
