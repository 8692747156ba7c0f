//! Theme store: the single source of truth for theme state.
//!
//! All mutation goes through [`ThemeStore::dispatch`]. The store enforces
//! three rules:
//!
//! 1. A theme is only ever replaced as a whole, and only after validation.
//! 2. A random-theme resolution is applied only when it belongs to the most
//!    recently issued request; anything older is discarded silently.
//! 3. Dispatch is a critical section. A dispatch issued from inside a
//!    listener is validated immediately and then queued, so listeners never
//!    observe a snapshot that changes underneath them. A dispatch from any
//!    other thread waits for the current round and is applied before it
//!    returns.

use crate::error::{ColorSourceError, ThemeError};
use crate::source::ColorSource;
use crate::theme::{Theme, ThemeDraft};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Sequence number of one random-theme request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the most recent random-theme request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected(ColorSourceError),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Short lowercase label for status lines and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Immutable snapshot handed to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    pub theme: Theme,
    pub request: RequestState,
    /// Most recently issued request, if any.
    pub latest_request: Option<RequestId>,
    /// Incremented once per applied dispatch.
    pub version: u64,
}

/// Store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeAction {
    ThemeChanged(ThemeDraft),
    RandomThemeRequested(RequestId),
    RandomThemeFulfilled(RequestId, Theme),
    RandomThemeRejected(RequestId, ColorSourceError),
}

/// An action that already passed validation.
#[derive(Debug)]
enum Transition {
    Changed(Theme),
    Requested(RequestId),
    Fulfilled(RequestId, Theme),
    Rejected(RequestId, ColorSourceError),
}

impl TryFrom<ThemeAction> for Transition {
    type Error = ThemeError;

    fn try_from(action: ThemeAction) -> Result<Self, Self::Error> {
        Ok(match action {
            ThemeAction::ThemeChanged(draft) => Self::Changed(draft.validate()?),
            ThemeAction::RandomThemeRequested(id) => Self::Requested(id),
            ThemeAction::RandomThemeFulfilled(id, theme) => Self::Fulfilled(id, theme),
            ThemeAction::RandomThemeRejected(id, err) => Self::Rejected(id, err),
        })
    }
}

type Listener = Arc<dyn Fn(&StoreState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Default)]
struct DispatchQueue {
    pending: VecDeque<Transition>,
    /// Thread currently applying and notifying, if any.
    drainer: Option<ThreadId>,
}

/// Owner of the canonical theme and request lifecycle.
pub struct ThemeStore {
    state: Mutex<StoreState>,
    listeners: Arc<Mutex<Listeners>>,
    queue: Mutex<DispatchQueue>,
    idle: Condvar,
    watch_tx: watch::Sender<StoreState>,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("state", &*lock(&self.state))
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

impl ThemeStore {
    /// Create a store holding `initial` with no request issued yet.
    pub fn new(initial: Theme) -> Self {
        Self::with_state(StoreState {
            theme: initial,
            request: RequestState::Idle,
            latest_request: None,
            version: 0,
        })
    }

    /// Create a store from one synchronous call to `source`.
    ///
    /// The bootstrap fetch counts as a completed request, so the store
    /// starts in [`RequestState::Fulfilled`].
    pub fn bootstrap(source: &dyn ColorSource) -> Result<Self, ThemeError> {
        let theme = source.generate()?;
        info!(%theme, "bootstrapped initial theme");
        Ok(Self::with_state(StoreState {
            theme,
            request: RequestState::Fulfilled,
            latest_request: None,
            version: 0,
        }))
    }

    fn with_state(state: StoreState) -> Self {
        let (watch_tx, _) = watch::channel(state.clone());
        Self {
            state: Mutex::new(state),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            queue: Mutex::new(DispatchQueue::default()),
            idle: Condvar::new(),
            watch_tx,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> StoreState {
        lock(&self.state).clone()
    }

    pub fn theme(&self) -> Theme {
        lock(&self.state).theme
    }

    pub fn request_state(&self) -> RequestState {
        lock(&self.state).request.clone()
    }

    /// Apply one action.
    ///
    /// Validation errors are returned before anything is queued, so a
    /// rejected action never touches state. Resolutions for superseded
    /// requests are discarded and still return `Ok`.
    ///
    /// Called from inside a listener, the action is queued and applied once
    /// the current notification round completes. Called from any other
    /// thread while a round is running, this blocks until that round
    /// finishes; the action is applied before `dispatch` returns.
    pub fn dispatch(&self, action: ThemeAction) -> Result<(), ThemeError> {
        let transition = Transition::try_from(action)?;
        let current = thread::current().id();
        {
            let mut queue = lock(&self.queue);
            if queue.drainer == Some(current) {
                debug!("dispatch deferred until current notification round completes");
                queue.pending.push_back(transition);
                return Ok(());
            }
            while queue.drainer.is_some() {
                queue = self
                    .idle
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            queue.drainer = Some(current);
            queue.pending.push_back(transition);
        }
        self.drain();
        Ok(())
    }

    fn drain(&self) {
        loop {
            let next = {
                let mut queue = lock(&self.queue);
                match queue.pending.pop_front() {
                    Some(transition) => transition,
                    None => {
                        queue.drainer = None;
                        self.idle.notify_all();
                        return;
                    }
                }
            };
            if let Some(snapshot) = self.apply(next) {
                self.watch_tx.send_replace(snapshot.clone());
                self.notify(&snapshot);
            }
        }
    }

    /// Reducer. Returns the new snapshot when state changed.
    fn apply(&self, transition: Transition) -> Option<StoreState> {
        let mut state = lock(&self.state);
        match transition {
            Transition::Changed(theme) => {
                state.theme = theme;
            }
            Transition::Requested(id) => {
                if state.latest_request.is_some_and(|latest| id <= latest) {
                    warn!(request = %id, "ignoring out-of-order request id");
                    return None;
                }
                state.latest_request = Some(id);
                state.request = RequestState::Pending;
            }
            Transition::Fulfilled(id, theme) => {
                if !is_current(&state, id) {
                    debug!(request = %id, "discarding superseded theme resolution");
                    return None;
                }
                info!(request = %id, %theme, "applied random theme");
                state.theme = theme;
                state.request = RequestState::Fulfilled;
            }
            Transition::Rejected(id, err) => {
                if !is_current(&state, id) {
                    debug!(request = %id, "discarding superseded theme failure");
                    return None;
                }
                warn!(request = %id, error = %err, "random theme request failed");
                state.request = RequestState::Rejected(err);
            }
        }
        state.version = state.version.saturating_add(1);
        Some(state.clone())
    }

    fn notify(&self, snapshot: &StoreState) {
        let listeners: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(snapshot))) {
                error!(
                    version = snapshot.version,
                    panic = %panic_message(payload.as_ref()),
                    "theme listener panicked"
                );
            }
        }
    }

    /// Register a listener called after every applied dispatch, in
    /// registration order. Dropping the returned handle deregisters it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreState) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Async view of the store for render loops.
    pub fn watch(&self) -> watch::Receiver<StoreState> {
        self.watch_tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

/// Scoped listener registration returned by [`ThemeStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Deregister now instead of at drop.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

fn is_current(state: &StoreState, id: RequestId) -> bool {
    state.latest_request == Some(id) && state.request.is_pending()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Listeners run outside every lock, so a poisoned guard still holds a
    // consistent value.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
