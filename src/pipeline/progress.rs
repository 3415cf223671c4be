//! Per-record progress reporting.
use super::RecordOutcome;
use std::io::{self, Write};

/// Observer for pipeline progress. Every hook defaults to a no-op.
pub trait Progress {
    /// A record is about to be resolved. `position` is 1-based.
    fn start(&mut self, _position: usize, _total: usize, _word: &str) {}
    /// Attempt `attempt` (2 or later) is about to run.
    fn retry(&mut self, _attempt: usize) {}
    fn finish(&mut self, _outcome: &RecordOutcome) {}
    /// Both stores were flushed after `processed` records.
    fn checkpoint(&mut self, _processed: usize) {}
}

impl Progress for () {}

/// Prints one line per record to stdout, e.g. `[3/40] lucid... retry(2)... OK`.
pub struct ConsoleProgress<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleProgress {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    // Progress output is best effort; a closed stdout must not abort a run.
    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn start(&mut self, position: usize, total: usize, word: &str) {
        self.emit(&format!("[{position}/{total}] {word}... "));
    }

    fn retry(&mut self, attempt: usize) {
        self.emit(&format!("retry({attempt})... "));
    }

    fn finish(&mut self, outcome: &RecordOutcome) {
        let tag = match outcome {
            RecordOutcome::Clean { .. } => "OK".to_string(),
            RecordOutcome::Imperfect {
                occurrences: Some(count),
                ..
            } => format!("KEPT ({count})"),
            RecordOutcome::Imperfect { .. } => "KEPT".to_string(),
            RecordOutcome::Error { last_error, .. } => {
                format!("ERROR: {}", crate::util::truncate_string(last_error, 120))
            }
            RecordOutcome::Skipped(reason) => format!("SKIP ({reason})"),
        };
        self.emit(&format!("{tag}\n"));
    }

    fn checkpoint(&mut self, processed: usize) {
        self.emit(&format!("  -- saved ({processed} processed)\n"));
    }
}
