use uuid::Uuid;

use crate::domain::order::Order;
use super::stage::Stage;

// ============================================================================
// Order Processing Errors
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessingError {
    #[error("Stage '{stage}' rejected order {order_id}: {reason}")]
    StageFailed {
        stage: Stage,
        order_id: Uuid,
        reason: String,
    },

    #[error("Order processing task failed: {0}")]
    TaskFailed(String),
}

impl ProcessingError {
    pub fn stage_failed(stage: Stage, order: &Order, reason: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            order_id: order.id(),
            reason: reason.into(),
        }
    }

    /// Stage that raised the error, if any
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(stage),
            Self::TaskFailed(_) => None,
        }
    }
}
