//! Copy-to-clipboard affordance for code blocks
//!
//! State machine: `Idle -> Copied` on trigger, `Copied -> Idle` when the revert
//! timer fires or on dismiss. The pending timer is stored next to the state
//! and aborted on dismiss, so a stale revert never lands.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::task::AbortHandle;

/// Default time before `Copied` reverts to `Idle`
pub const DEFAULT_REVERT_DELAY: Duration = Duration::from_millis(1000);

/// Visible state of a copy button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
}

impl CopyState {
    /// Button label
    pub fn label(self) -> &'static str {
        match self {
            CopyState::Idle => "Copy",
            CopyState::Copied => "Copied!",
        }
    }
}

/// Failure reported by a clipboard backend. Never surfaced to the user.
#[derive(Error, Debug)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

/// Destination of copied text
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard kept in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last copied text
    pub fn contents(&self) -> Option<String> {
        lock(&self.contents).clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *lock(&self.contents) = Some(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: CopyState,
    pending: Option<AbortHandle>,
    /// Bumped on every transition; a timer only reverts its own generation
    generation: u64,
}

/// One copy button bound to the exact text of a code block
#[derive(Clone)]
pub struct CopyAffordance {
    text: Arc<str>,
    clipboard: Arc<dyn Clipboard>,
    delay: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for CopyAffordance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyAffordance")
            .field("state", &self.state())
            .field("delay", &self.delay)
            .finish()
    }
}

impl CopyAffordance {
    pub fn new(text: impl Into<Arc<str>>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self::with_delay(text, clipboard, DEFAULT_REVERT_DELAY)
    }

    pub fn with_delay(
        text: impl Into<Arc<str>>,
        clipboard: Arc<dyn Clipboard>,
        delay: Duration,
    ) -> Self {
        Self {
            text: text.into(),
            clipboard,
            delay,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn state(&self) -> CopyState {
        lock(&self.inner).state
    }

    /// Text that a trigger copies
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Copy the text and show `Copied` until the revert delay elapses.
    ///
    /// Clipboard failures are logged and otherwise ignored. Triggering while
    /// already `Copied` restarts the delay. Must be called inside a Tokio
    /// runtime.
    pub fn trigger(&self) {
        if let Err(e) = self.clipboard.write_text(&self.text) {
            tracing::debug!("Ignoring clipboard failure: {}", e);
        }

        let mut inner = lock(&self.inner);
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        inner.generation += 1;
        inner.state = CopyState::Copied;

        let generation = inner.generation;
        let shared = Arc::clone(&self.inner);
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = lock(&shared);
            if inner.generation == generation {
                inner.state = CopyState::Idle;
                inner.pending = None;
            }
        });
        inner.pending = Some(task.abort_handle());
    }

    /// Return to `Idle` now and cancel the pending revert
    pub fn dismiss(&self) {
        let mut inner = lock(&self.inner);
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        inner.generation += 1;
        inner.state = CopyState::Idle;
    }

    /// Whether a revert timer is still scheduled
    pub fn has_pending_revert(&self) -> bool {
        lock(&self.inner)
            .pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingClipboard;

    impl Clipboard for FailingClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError("denied".into()))
        }
    }

    fn affordance(text: &str) -> (CopyAffordance, Arc<MemoryClipboard>) {
        let clipboard = Arc::new(MemoryClipboard::new());
        (CopyAffordance::new(text, clipboard.clone()), clipboard)
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_copies_exact_text() {
        let (copy, clipboard) = affordance("int main() {}\n");
        assert_eq!(copy.state(), CopyState::Idle);

        copy.trigger();
        assert_eq!(copy.state(), CopyState::Copied);
        assert_eq!(clipboard.contents().as_deref(), Some("int main() {}\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverts_after_delay() {
        let (copy, _) = affordance("x");
        copy.trigger();

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(copy.state(), CopyState::Copied);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(copy.state(), CopyState::Idle);
        assert!(!copy.has_pending_revert());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_timer() {
        let (copy, _) = affordance("x");
        copy.trigger();
        assert!(copy.has_pending_revert());

        copy.dismiss();
        assert_eq!(copy.state(), CopyState::Idle);
        assert!(!copy.has_pending_revert());

        // A new copy is not cut short by the cancelled timer
        tokio::time::sleep(Duration::from_millis(500)).await;
        copy.trigger();
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(copy.state(), CopyState::Copied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_restarts_delay() {
        let (copy, _) = affordance("x");
        copy.trigger();
        tokio::time::sleep(Duration::from_millis(800)).await;
        copy.trigger();
        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(copy.state(), CopyState::Copied);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(copy.state(), CopyState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_failure_still_reports_copied() {
        let copy = CopyAffordance::with_delay(
            "x",
            Arc::new(FailingClipboard),
            Duration::from_millis(1500),
        );
        copy.trigger();
        assert_eq!(copy.state(), CopyState::Copied);
        tokio::time::sleep(Duration::from_millis(1501)).await;
        assert_eq!(copy.state(), CopyState::Idle);
    }

    #[test]
    fn test_labels() {
        assert_eq!(CopyState::Idle.label(), "Copy");
        assert_eq!(CopyState::Copied.label(), "Copied!");
    }
}
