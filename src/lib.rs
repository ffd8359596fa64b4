// ============================================================================
// Restaurant Orders
// ============================================================================
//
// Structure:
// - domain/   - Menu items (dishes, combos, prices) and immutable orders
// - pipeline/ - Handler chain that carries an order through its stages
// - metrics/  - Prometheus counters for chain runs
// - demo      - The fixed sample scenario the binary runs
//
// ============================================================================

pub mod demo;
pub mod domain;
pub mod metrics;
pub mod pipeline;
