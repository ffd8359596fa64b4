// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyOrder,

    #[error("Failed to serialize order: {0}")]
    Serialization(#[from] serde_json::Error),
}
