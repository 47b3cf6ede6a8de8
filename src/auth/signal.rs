//! Session Signal
//! Mission: Tell every live listener that the current session is dead

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Observer for the token-expired broadcast.
///
/// Delivery may repeat for a single teardown (every failing call emits), so
/// implementations must be idempotent and safe to invoke when already
/// logged out.
pub trait SessionObserver: Send + Sync {
    fn on_session_expired(&self);
}

/// Payload-free "token expired" broadcast.
///
/// Subscribers are held weakly; a dropped observer falls out of the list on
/// the next emit. Delivery is synchronous: every live subscriber has been
/// notified before `emit_expired` returns.
#[derive(Clone, Default)]
pub struct SessionSignal {
    observers: Arc<Mutex<Vec<Weak<dyn SessionObserver>>>>,
}

impl SessionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<O: SessionObserver + 'static>(&self, observer: &Arc<O>) {
        let observer: Arc<dyn SessionObserver> = observer.clone();
        let weak: Weak<dyn SessionObserver> = Arc::downgrade(&observer);
        self.observers.lock().push(weak);
    }

    pub fn emit_expired(&self) {
        // Upgrade under the lock, notify outside it so a handler may
        // subscribe or emit without deadlocking.
        let live: Vec<Arc<dyn SessionObserver>> = {
            let mut observers = self.observers.lock();
            observers.retain(|weak| weak.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        debug!("Session expiry signal: notifying {} listener(s)", live.len());
        for observer in live {
            observer.on_session_expired();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingObserver {
        hits: AtomicUsize,
    }

    impl SessionObserver for CountingObserver {
        fn on_session_expired(&self) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_synchronous_delivery() {
        let signal = SessionSignal::new();
        let observer = Arc::new(CountingObserver::default());
        signal.subscribe(&observer);

        signal.emit_expired();
        assert_eq!(observer.hits.load(Ordering::SeqCst), 1);

        // Repeat delivery is allowed; observers must tolerate it
        signal.emit_expired();
        assert_eq!(observer.hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_all_subscribers_notified() {
        let signal = SessionSignal::new();
        let first = Arc::new(CountingObserver::default());
        let second = Arc::new(CountingObserver::default());
        signal.subscribe(&first);
        signal.subscribe(&second);

        signal.emit_expired();
        assert_eq!(first.hits.load(Ordering::SeqCst), 1);
        assert_eq!(second.hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_subscriber_skipped() {
        let signal = SessionSignal::new();
        let kept = Arc::new(CountingObserver::default());
        signal.subscribe(&kept);
        {
            let dropped = Arc::new(CountingObserver::default());
            signal.subscribe(&dropped);
        }

        signal.emit_expired();
        assert_eq!(kept.hits.load(Ordering::SeqCst), 1);
    }
}
