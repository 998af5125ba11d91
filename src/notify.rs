//! Transient toast notifications

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::sync::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Shared queue of toasts waiting to be shown
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    queue: Arc<Mutex<VecDeque<Toast>>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    fn push(&self, kind: ToastKind, message: String) {
        lock(&self.queue).push_back(Toast { kind, message });
    }

    /// Take every pending toast, oldest first
    pub fn drain(&self) -> Vec<Toast> {
        lock(&self.queue).drain(..).collect()
    }

    /// Most recent toast without consuming it
    pub fn latest(&self) -> Option<Toast> {
        lock(&self.queue).back().cloned()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.queue).is_empty()
    }
}
