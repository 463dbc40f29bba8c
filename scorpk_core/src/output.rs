//! Output channel for program transcripts

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Receives every line a program produces: print output, state announcements
/// and error reports
pub trait OutputSink: Send + Sync {
    /// Emit one complete line
    fn emit(&self, line: &str);
}

/// Writes each line to stdout under the stdout lock, so lines from parallel
/// tasks never interleave mid-line
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            tracing::warn!("Failed to write output line: {}", e);
        }
    }
}

/// Collects lines in memory
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OutputSink for BufferSink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_buffer_collects_in_order() {
        let sink = BufferSink::new();
        sink.emit("a");
        sink.emit("b");
        assert_eq!(sink.lines(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_buffer_shared_across_threads() {
        let sink = Arc::new(BufferSink::new());
        std::thread::scope(|s| {
            for i in 0..4 {
                let sink = Arc::clone(&sink);
                s.spawn(move || sink.emit(&i.to_string()));
            }
        });
        let mut lines = sink.lines();
        lines.sort();
        assert_eq!(lines, vec!["0", "1", "2", "3"]);
    }
}
