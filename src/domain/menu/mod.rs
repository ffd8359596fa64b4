// ============================================================================
// Menu Domain - Priced Items
// ============================================================================
//
// This module contains the item model that orders are built from:
// - Value objects (Price)
// - Errors (MenuError enum)
// - Items (Dish, CompositeItem, the Item sum type and the ItemRef handle)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod item;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use item::*;
