//! Host navigation: dismissal and the "about to leave this screen" hook

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Event delivered to before-leave listeners
#[derive(Debug, Default)]
pub struct LeaveEvent {
    default_prevented: bool,
}

impl LeaveEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the screen; the listener handles the gesture itself
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Handle returned by listener registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type BeforeLeaveListener = Box<dyn Fn(&mut LeaveEvent) + Send + Sync>;

/// Host navigation substrate
pub trait Navigator: Send + Sync {
    /// Dismiss the current screen
    fn go_back(&self);

    fn add_before_leave_listener(&self, listener: BeforeLeaveListener) -> ListenerId;

    fn remove_before_leave_listener(&self, id: ListenerId);
}

/// Navigator for a single full-screen host such as the terminal app
#[derive(Default)]
pub struct ScreenNavigator {
    listeners: Mutex<Vec<(ListenerId, BeforeLeaveListener)>>,
    next_id: AtomicU64,
    dismissed: AtomicBool,
    go_back_calls: AtomicU64,
}

impl ScreenNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, BeforeLeaveListener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The user asked to leave (Esc, back gesture).
    ///
    /// Runs every listener; when none prevents the default, the screen is
    /// dismissed. Returns whether it was dismissed.
    pub fn request_leave(&self) -> bool {
        let mut event = LeaveEvent::new();
        for (_, listener) in self.listeners().iter() {
            listener(&mut event);
        }
        if event.is_default_prevented() {
            tracing::debug!("Leave intercepted by listener");
            false
        } else {
            self.go_back();
            true
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::SeqCst)
    }

    pub fn go_back_calls(&self) -> u64 {
        self.go_back_calls.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }
}

impl Navigator for ScreenNavigator {
    fn go_back(&self) {
        self.go_back_calls.fetch_add(1, Ordering::SeqCst);
        self.dismissed.store(true, Ordering::SeqCst);
    }

    fn add_before_leave_listener(&self, listener: BeforeLeaveListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners().push((id, listener));
        id
    }

    fn remove_before_leave_listener(&self, id: ListenerId) {
        self.listeners().retain(|(existing, _)| *existing != id);
    }
}
