//! Default values for the review options.

/// Defaults the schema builder bakes into every [`crate::ModeSchema`].
///
/// Passed explicitly so callers (and tests) can change a default without
/// touching any process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDefaults {
    pub model: String,
    pub query_strategy: String,
    pub balance_strategy: String,
    pub n_instances: i64,
    pub n_prior_included: i64,
    pub n_prior_excluded: i64,
    pub verbose: i64,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            model: "lstm_pool".into(),
            query_strategy: "rand_max".into(),
            balance_strategy: "triple_balance".into(),
            n_instances: 20,
            n_prior_included: 10,
            n_prior_excluded: 10,
            verbose: 1,
        }
    }
}
