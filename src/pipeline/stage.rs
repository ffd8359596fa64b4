use std::fmt;

// ============================================================================
// Processing Stages
// ============================================================================

/// A step an order passes through. Stages differ only in how they are
/// named and announced, so they are plain data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Receive,
    Prepare,
    Deliver,
    Custom(String),
}

impl Stage {
    /// Short identifier used in logs and metric labels
    pub fn name(&self) -> &str {
        match self {
            Stage::Receive => "receive",
            Stage::Prepare => "prepare",
            Stage::Deliver => "deliver",
            Stage::Custom(name) => name,
        }
    }

    /// Human-readable prefix of the status line
    pub fn label(&self) -> &str {
        match self {
            Stage::Receive => "Order received",
            Stage::Prepare => "Order is being prepared",
            Stage::Deliver => "Order is being delivered",
            Stage::Custom(name) => name,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
