pub mod analysis;
pub mod inventory;
pub mod macc;
pub mod scenario;
pub mod trajectory;

use clap::ValueEnum;

use carbon_pathways_core::config::ExclusionPolicy;

/// `--exclusion-policy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Skip a measure when an earlier one it lists was processed
    Sequential,
    /// Also skip a measure listed by an earlier one
    Symmetric,
}

impl From<PolicyArg> for ExclusionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Sequential => ExclusionPolicy::Sequential,
            PolicyArg::Symmetric => ExclusionPolicy::Symmetric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[arg(long, value_enum)]
        exclusion_policy: Option<PolicyArg>,
    }

    #[test]
    fn test_policy_flag_values() {
        let cli = Cli::try_parse_from(["cpw", "--exclusion-policy", "symmetric"]).unwrap();
        assert_eq!(cli.exclusion_policy.map(ExclusionPolicy::from), Some(ExclusionPolicy::Symmetric));

        let cli = Cli::try_parse_from(["cpw"]).unwrap();
        assert!(cli.exclusion_policy.is_none());

        assert!(Cli::try_parse_from(["cpw", "--exclusion-policy", "both"]).is_err());
    }
}
