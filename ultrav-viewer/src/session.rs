//! Liveness of one mount of the viewer

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared by every task spawned during one mount.
///
/// Asynchronous continuations only touch shared scene state through
/// [`MountSession::with_live`], which checks liveness while holding the
/// lock; [`MountSession::end`] flips the flag under the same lock.
#[derive(Debug, Clone)]
pub struct MountSession {
    id: u64,
    alive: Arc<AtomicBool>,
}

impl MountSession {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Run `f` on the locked value if the session is still alive
    pub fn with_live<T, R>(&self, shared: &RwLock<T>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = shared.write();
        if !self.is_alive() {
            return None;
        }
        Some(f(&mut guard))
    }

    /// End the session. No `with_live` call on `shared` runs after this returns.
    pub fn end<T>(&self, shared: &RwLock<T>) {
        let _guard = shared.write();
        self.alive.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_live_stops_after_end() {
        let session = MountSession::new(7);
        let value = RwLock::new(0);

        assert_eq!(session.with_live(&value, |v| { *v += 1; *v }), Some(1));
        session.end(&value);
        assert!(!session.is_alive());
        assert_eq!(session.with_live(&value, |v| { *v += 1; *v }), None);
        assert_eq!(*value.read(), 1);
    }

    #[test]
    fn test_clones_share_liveness() {
        let session = MountSession::new(1);
        let clone = session.clone();
        session.end(&RwLock::new(()));
        assert!(!clone.is_alive());
        assert_eq!(clone.id(), 1);
    }
}
