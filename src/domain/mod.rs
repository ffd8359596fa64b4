// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory with value objects, errors and the
// types that carry its rules:
// - menu  - dishes, combos and prices
// - order - immutable orders and their builder
//
// Order processing (the handler chain) lives in `crate::pipeline`.
//
// ============================================================================

pub mod menu;
pub mod order;
