//! The message loop run by every listener thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cross-thread stop flag shared by a listener and its loop thread.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The three outcomes of one blocking retrieval.
#[derive(Debug, PartialEq, Eq)]
pub enum Retrieved<M> {
    Message(M),
    /// WM_QUIT was pulled from the queue.
    Quit,
    /// Retrieval itself failed with this OS error code.
    Failed(u32),
}

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    Failed(u32),
    Cancelled,
}

/// A per-thread message queue.
pub trait MessageSource {
    type Message;

    /// Blocks until the next message is available.
    fn retrieve(&mut self) -> Retrieved<Self::Message>;

    /// Translates (where needed) and hands the message to its window.
    fn route(&mut self, message: &Self::Message);
}

/// Pumps `source` until it quits, fails, or `cancel` is raised. The flag
/// is checked around every retrieval, so whoever raises it must also post
/// something to the queue if the loop may be blocked.
pub fn run<S: MessageSource>(source: &mut S, cancel: &CancelSignal) -> LoopExit {
    loop {
        if cancel.is_cancelled() {
            return LoopExit::Cancelled;
        }
        match source.retrieve() {
            Retrieved::Quit => return LoopExit::Quit,
            Retrieved::Failed(code) => return LoopExit::Failed(code),
            Retrieved::Message(message) => {
                if cancel.is_cancelled() {
                    return LoopExit::Cancelled;
                }
                source.route(&message);
            }
        }
    }
}
