//! Layout guard: gates rendering of the authenticated shell on a resolved
//! session.
//!
//! The session is owned elsewhere and observed as a stream of
//! [`SessionQuery`] snapshots. The guard starts `Pending`, and once the
//! query resolves it never goes back to `Pending` for the rest of the mount.
//! The transition to `Unauthenticated` navigates to the sign-in page exactly
//! once and is terminal.

use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, watch};

use crate::auth::{AuthError, SessionRecord};
use crate::route::SIGN_IN_PATH;

/// Snapshot of a reactive session query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionQuery {
    pub data: Option<SessionRecord>,
    pub is_pending: bool,
    pub error: Option<String>,
}

impl SessionQuery {
    pub fn pending() -> Self {
        Self { data: None, is_pending: true, error: None }
    }

    pub fn resolved(data: Option<SessionRecord>) -> Self {
        Self { data, is_pending: false, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { data: None, is_pending: false, error: Some(error.into()) }
    }

    pub fn from_lookup(result: Result<Option<SessionRecord>, AuthError>) -> Self {
        match result {
            Ok(data) => Self::resolved(data),
            Err(err) => Self::failed(err.to_string()),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.is_pending {
            return SessionState::Pending;
        }
        if self.error.is_some() {
            return SessionState::Unauthenticated;
        }
        match &self.data {
            Some(record) if !record.is_expired() => SessionState::Authenticated(Box::new(record.clone())),
            _ => SessionState::Unauthenticated,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Pending,
    Unauthenticated,
    Authenticated(Box<SessionRecord>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendering {
    Loading,
    /// Render nothing; either a redirect is underway or the guard is unmounted
    Nothing,
    Shell(Box<SessionRecord>),
}

pub trait Navigator {
    fn push(&self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn push(&self, path: &str) {
        (**self).push(path)
    }
}

/// Navigator that records the requested location so a server handler can
/// answer with an HTTP redirect
#[derive(Debug, Default)]
pub struct RedirectSlot(Mutex<Option<String>>);

impl RedirectSlot {
    pub fn location(&self) -> Option<String> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }
}

impl Navigator for RedirectSlot {
    fn push(&self, path: &str) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(path.to_string());
        }
    }
}

pub struct LayoutGuard<N: Navigator> {
    navigator: N,
    state: SessionState,
    mounted: bool,
}

impl<N: Navigator> LayoutGuard<N> {
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            state: SessionState::Pending,
            mounted: true,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn observe(&mut self, query: &SessionQuery) -> Rendering {
        if !self.mounted {
            return Rendering::Nothing;
        }

        match query.state() {
            SessionState::Pending => match &self.state {
                SessionState::Pending => Rendering::Loading,
                // A late pending snapshot keeps the resolved shell
                SessionState::Authenticated(record) => Rendering::Shell(record.clone()),
                SessionState::Unauthenticated => Rendering::Nothing,
            },
            _ if self.state == SessionState::Unauthenticated => Rendering::Nothing,
            SessionState::Authenticated(record) => {
                self.state = SessionState::Authenticated(record.clone());
                Rendering::Shell(record)
            }
            SessionState::Unauthenticated => {
                self.state = SessionState::Unauthenticated;
                tracing::debug!("no session for shell, navigating to sign-in");
                self.navigator.push(SIGN_IN_PATH);
                Rendering::Nothing
            }
        }
    }

    /// Follow `source` until the guard resolves to `Unauthenticated`, the
    /// source closes, or `unmount` fires (or its sender is dropped). Every
    /// rendering is handed to `render`; nothing is rendered or navigated
    /// after unmount.
    pub async fn drive(
        mut self,
        mut source: watch::Receiver<SessionQuery>,
        mut unmount: oneshot::Receiver<()>,
        mut render: impl FnMut(Rendering),
    ) {
        // Unmounted (or handle dropped) before the first render
        if !matches!(unmount.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
            self.unmount();
            return;
        }

        let initial = source.borrow_and_update().clone();
        render(self.observe(&initial));

        while self.mounted && self.state != SessionState::Unauthenticated {
            tokio::select! {
                biased;
                _ = &mut unmount => {
                    self.unmount();
                }
                changed = source.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let query = source.borrow_and_update().clone();
                    render(self.observe(&query));
                }
            }
        }
    }
}
