// ============================================================================
// Chain Configuration
// ============================================================================

/// What a chain does when a stage rejects an order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the failing stage and return its error
    #[default]
    Abort,
    /// Record the failure and carry on with the next stage
    Continue,
}

#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Behaviour on stage failure
    pub failure_policy: FailurePolicy,
    /// Maximum orders processed at the same time by `process_batch`
    pub max_concurrency: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            max_concurrency: 4,
        }
    }
}

impl ChainConfig {
    /// Abort on first failure, one order at a time
    pub fn strict() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            max_concurrency: 1,
        }
    }

    /// Run every stage regardless of failures, with more parallelism
    pub fn lenient() -> Self {
        Self {
            failure_policy: FailurePolicy::Continue,
            max_concurrency: 8,
        }
    }
}
