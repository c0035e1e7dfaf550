pub mod bau;
pub mod target;

pub use bau::{
    calculate_bau, compute_bau, compute_bau_by_scope, growth_rate_for, BauInput, BauOutput,
    ScopeTrajectories,
};
pub use target::{
    calculate_target, compute_target, sbti_checkpoints, SbtiCheckpoints, TargetInput,
    TargetOutput,
};
