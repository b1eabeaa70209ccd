//! Per-screen orchestration over the repositories.
//!
//! Each screen keeps its state in a [`ViewState`], a thin wrapper over a
//! tokio watch channel. Every mutation notifies subscribed receivers, so
//! bindings observe changes without any explicit refresh step.

pub mod filter;
pub mod project_list;
pub mod task_form;
pub mod task_list;

pub use filter::TaskFilter;
pub use project_list::{ProjectListState, ProjectListView, ProjectStatsEntry};
pub use task_form::{FormMode, TaskFormState, TaskFormView};
pub use task_list::{TaskListState, TaskListView};

use tokio::sync::watch;
use tracing::debug;

/// Load state of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
    /// Form submitted successfully.
    Saved,
}

/// User confirmation step before destructive actions.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Observable state container for one screen.
pub struct ViewState<S> {
    tx: watch::Sender<S>,
}

impl<S> ViewState<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Receiver that observes every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Apply a change and notify subscribers. With no subscribers left the
    /// change is still recorded and the notification is simply dropped.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        if self.tx.receiver_count() == 0 {
            debug!("View has no subscribers; recording state without notifying");
        }
        self.tx.send_modify(f);
    }
}

impl<S: Clone> ViewState<S> {
    /// Copy of the current state.
    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }
}

impl<S: Default> Default for ViewState<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_notifies_subscribers() {
        let state = ViewState::new(0u32);
        let mut rx = state.subscribe();
        assert!(!rx.has_changed().unwrap());

        state.update(|n| *n += 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn update_without_subscribers_is_recorded() {
        let state = ViewState::new(String::new());
        let rx = state.subscribe();
        drop(rx);

        state.update(|s| s.push_str("late result"));
        assert_eq!(state.snapshot(), "late result");
    }

    #[test]
    fn closures_confirm() {
        let yes = |_: &str| true;
        let no = |_: &str| false;
        assert!(yes.confirm("delete?"));
        assert!(!no.confirm("delete?"));
    }
}
