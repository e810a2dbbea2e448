//! Double-buffered command log.
//!
//! Operations append to the *current* buffer. [`CommandLog::flush`] copies
//! it into a fresh shared slice that becomes the *old commands* for the
//! next tick, then clears the current buffer. Because each flush allocates
//! a new `Arc<[Command]>`, consumers still holding the previous tick's
//! slice are never disturbed.

use std::sync::Arc;

use satchel_core::{events, Command, CommandEvent};

/// Append-only per-tick command buffer plus the published previous tick.
#[derive(Clone, Debug)]
pub struct CommandLog {
    current: Vec<Command>,
    old: Arc<[Command]>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLog {
    /// Create a log with nothing recorded and nothing published.
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
            old: Arc::from(Vec::<Command>::new()),
        }
    }

    /// Append one committed mutation.
    pub fn push(&mut self, command: Command) {
        self.current.push(command);
    }

    /// Pre-size the current buffer for `additional` more commands.
    pub fn reserve(&mut self, additional: usize) {
        self.current.reserve(additional);
    }

    /// Commands recorded since the last flush.
    pub fn current(&self) -> &[Command] {
        &self.current
    }

    /// Commands published by the last flush.
    pub fn old_commands(&self) -> Arc<[Command]> {
        Arc::clone(&self.old)
    }

    /// Publish the current buffer as the old commands and start afresh.
    ///
    /// Returns the number of commands published.
    pub fn flush(&mut self) -> usize {
        let published = self.current.len();
        self.old = Arc::from(self.current.as_slice());
        self.current.clear();
        tracing::debug!(published, "command log flushed");
        published
    }

    /// Drop both buffers.
    pub fn clear(&mut self) {
        self.current.clear();
        self.old = Arc::from(Vec::<Command>::new());
    }
}

/// Collect `commands` into logical events, folding type renames.
pub fn interpret(commands: &[Command]) -> Vec<CommandEvent<'_>> {
    events(commands).collect()
}
