// ============================================================================
// Order Processing Pipeline
// ============================================================================
//
// Structure:
// - stage   - Stage names and status labels
// - sink    - Thread-safe destinations for status lines
// - handler - OrderHandler, one link of the chain
// - chain   - HandlerChain: failure policy, metrics and batch processing
// - config  - ChainConfig and FailurePolicy
// - errors  - ProcessingError
//
// ============================================================================

mod chain;
mod config;
mod errors;
mod handler;
mod sink;
mod stage;

pub use chain::{ChainReport, HandlerChain};
pub use config::{ChainConfig, FailurePolicy};
pub use errors::ProcessingError;
pub use handler::{ChainIter, OrderHandler, ProcessFn};
pub use sink::{MemorySink, StatusSink, StdoutSink};
pub use stage::Stage;
