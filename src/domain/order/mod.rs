// ============================================================================
// Order Domain - Building Orders from Menu Items
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Errors (OrderError enum)
// - Aggregate (the immutable Order)
// - Builder (OrderBuilder staging area)
//
// ============================================================================

pub mod errors;
pub mod aggregate;
pub mod builder;

// Re-export for convenience
pub use errors::*;
pub use aggregate::*;
pub use builder::*;
