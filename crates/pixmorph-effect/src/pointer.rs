//! Pointer listener lifecycle.

use std::fmt;
use std::io;
use std::sync::Arc;

/// The host side of pointer tracking: whatever has to be switched on for
/// pointer move/leave events to reach the effect (mouse capture in a
/// terminal).
pub trait PointerHost: Send + Sync {
    fn attach(&self) -> io::Result<()>;
    fn detach(&self);
}

/// A held pointer listener. Dropping it detaches from the host.
pub struct PointerRegistration {
    host: Arc<dyn PointerHost>,
}

impl PointerRegistration {
    pub fn acquire(host: Arc<dyn PointerHost>) -> io::Result<Self> {
        host.attach()?;
        Ok(Self { host })
    }
}

impl Drop for PointerRegistration {
    fn drop(&mut self) {
        self.host.detach();
    }
}

impl fmt::Debug for PointerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerRegistration").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counting {
        attached: AtomicUsize,
        detached: AtomicUsize,
    }

    impl PointerHost for Counting {
        fn attach(&self) -> io::Result<()> {
            self.attached.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn detach(&self) {
            self.detached.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Refusing;

    impl PointerHost for Refusing {
        fn attach(&self) -> io::Result<()> {
            Err(io::Error::other("no mouse"))
        }

        fn detach(&self) {
            panic!("never attached");
        }
    }

    #[test]
    fn drop_detaches_once() {
        let host = Arc::new(Counting::default());
        let registration = PointerRegistration::acquire(host.clone()).unwrap();
        assert_eq!(host.attached.load(Ordering::SeqCst), 1);
        drop(registration);
        assert_eq!(host.detached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_attach_holds_nothing() {
        assert!(PointerRegistration::acquire(Arc::new(Refusing)).is_err());
    }
}
