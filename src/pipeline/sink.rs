use std::io::Write;

use parking_lot::Mutex;

// ============================================================================
// Status Sinks
// ============================================================================
//
// Where stages send their status lines. Sinks are shared by every order
// running through a chain, possibly from several threads at once, so
// each implementation must be safe for concurrent use.
//
// ============================================================================

pub trait StatusSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes one line per status to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl StatusSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", line) {
            tracing::warn!(error = %e, "Failed to write status line");
        }
    }
}

/// Keeps every emitted line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl StatusSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
