//! Pending-navigation tracker
//!
//! Holds at most one "this page moved or was created" fact at a time so the
//! next interested party (a client sending `ready`, or the not-found
//! interceptor) can redirect the browser to the page's new URL.
//!
//! All transitions happen under one lock as single read-then-write steps;
//! the public surface is set / try-consume only, which keeps consumption
//! exactly-once even when a session and the interceptor race.

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Mutex;

/// What produced the pending fact. The not-found interceptor only honors
/// rename-origin facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOrigin {
    Rename,
    Create,
}

#[derive(Debug, Clone, PartialEq)]
enum NavState {
    /// No outstanding fact.
    Idle,
    /// A file was created; its canonical URL is unknown until the next
    /// rebuild reports the page's identity.
    AwaitingResolution { changed_path: Utf8PathBuf },
    /// The new URL is known and ready to hand to exactly one consumer.
    Resolved { new_url: String, origin: NavOrigin },
}

/// Process-wide tracker shared by all sessions and the rebuild bridge.
#[derive(Debug)]
pub struct PendingNavigation {
    state: Mutex<NavState>,
}

impl PendingNavigation {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NavState::Idle),
        }
    }

    /// A rename already knows its destination URL; the fact is immediately
    /// consumable. Overwrites any unconsumed prior fact (last write wins).
    pub fn record_rename(&self, new_url: String) {
        let mut state = self.state.lock().unwrap();
        *state = NavState::Resolved {
            new_url,
            origin: NavOrigin::Rename,
        };
    }

    /// A create only knows which file changed; the URL arrives with the
    /// next rebuild. Overwrites any unconsumed prior fact.
    pub fn record_create(&self, changed_path: Utf8PathBuf) {
        let mut state = self.state.lock().unwrap();
        *state = NavState::AwaitingResolution { changed_path };
    }

    /// Called by the rebuild bridge once a page has been rebuilt. If the
    /// rebuilt source is the file we are waiting on, the fact becomes
    /// consumable. Returns whether anything was resolved.
    pub fn resolve_rebuilt(&self, source: &Utf8Path, new_url: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match &*state {
            NavState::AwaitingResolution { changed_path } if same_file(changed_path, source) => {
                *state = NavState::Resolved {
                    new_url: new_url.to_string(),
                    origin: NavOrigin::Create,
                };
                true
            }
            _ => false,
        }
    }

    /// Consume a resolved fact, whatever its origin. Used by the `ready`
    /// command path. Exactly-once: a second call sees nothing.
    pub fn take_redirect(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, NavState::Idle) {
            NavState::Resolved { new_url, .. } => Some(new_url),
            other => {
                *state = other;
                None
            }
        }
    }

    /// Consume a resolved fact only if a rename produced it. Used by the
    /// not-found interceptor; create-origin facts are left for `ready`.
    pub fn take_rename_redirect(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, NavState::Idle) {
            NavState::Resolved {
                new_url,
                origin: NavOrigin::Rename,
            } => Some(new_url),
            other => {
                *state = other;
                None
            }
        }
    }
}

impl Default for PendingNavigation {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare by filesystem identity where possible, so that a watcher's
/// canonical absolute path still matches the path we resolved ourselves.
fn same_file(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_is_immediately_consumable() {
        let nav = PendingNavigation::new();
        nav.record_rename("/guide/b/".into());
        assert_eq!(nav.take_redirect().as_deref(), Some("/guide/b/"));
    }

    #[test]
    fn test_consumption_is_exactly_once() {
        let nav = PendingNavigation::new();
        nav.record_rename("/b/".into());
        assert!(nav.take_redirect().is_some());
        assert!(nav.take_redirect().is_none());
        assert!(nav.take_rename_redirect().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let nav = PendingNavigation::new();
        nav.record_rename("/first/".into());
        nav.record_rename("/second/".into());
        assert_eq!(nav.take_redirect().as_deref(), Some("/second/"));
        assert!(nav.take_redirect().is_none());
    }

    #[test]
    fn test_create_awaits_rebuild() {
        let nav = PendingNavigation::new();
        nav.record_create(Utf8PathBuf::from("/docs/new.md"));

        // Not consumable until the rebuild reports the page
        assert!(nav.take_redirect().is_none());

        // A rebuild of some other file does not resolve it
        assert!(!nav.resolve_rebuilt(Utf8Path::new("/docs/other.md"), "/other/"));
        assert!(nav.take_redirect().is_none());

        assert!(nav.resolve_rebuilt(Utf8Path::new("/docs/new.md"), "/new/"));
        assert_eq!(nav.take_redirect().as_deref(), Some("/new/"));
    }

    #[test]
    fn test_interceptor_ignores_create_origin() {
        let nav = PendingNavigation::new();
        nav.record_create(Utf8PathBuf::from("/docs/new.md"));
        nav.resolve_rebuilt(Utf8Path::new("/docs/new.md"), "/new/");

        // The 404 interceptor must not steal a create-origin fact
        assert!(nav.take_rename_redirect().is_none());
        assert_eq!(nav.take_redirect().as_deref(), Some("/new/"));
    }

    #[test]
    fn test_resolve_requires_awaiting_state() {
        let nav = PendingNavigation::new();
        assert!(!nav.resolve_rebuilt(Utf8Path::new("/docs/a.md"), "/a/"));

        nav.record_rename("/b/".into());
        // A rebuild notification does not disturb an already-resolved rename
        assert!(!nav.resolve_rebuilt(Utf8Path::new("/docs/a.md"), "/a/"));
        assert_eq!(nav.take_redirect().as_deref(), Some("/b/"));
    }
}
