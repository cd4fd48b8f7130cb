//! Process-unique names for window classes.
//!
//! Window classes are registered per process, so two listeners must never
//! ask for the same class name. The pid keeps names distinct from other
//! processes using the same prefix in logs; the counter keeps them distinct
//! inside this one.

use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_PREFIX: &str = "wts-notify";

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueName {
    pub id: u64,
    pub class: String,
    pub window: String,
}

impl UniqueName {
    pub fn next(prefix: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let class = format!("{prefix}-{}-{id}", std::process::id());
        let window = format!("{class}-sink");
        Self { id, class, window }
    }

    /// Name for the thread that owns the window. Built from the counter
    /// alone, since the caller's prefix may hold bytes a thread name can't.
    pub fn thread_name(&self) -> String {
        format!("session-listener-{}", self.id)
    }
}
