use rust_decimal::Decimal;

// ============================================================================
// Menu Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("Price cannot be negative: {0}")]
    InvalidPrice(Decimal),

    #[error("Adding '{child}' to '{parent}' would make the combo contain itself")]
    CyclicComposite { parent: String, child: String },

    #[error("Item is not a combo: {0}")]
    NotComposite(String),
}
