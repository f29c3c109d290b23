//! Runtime-wide coordination between application code and native callbacks.
//!
//! libspotify calls back from its own threads, at its own cadence. Every
//! callback enters the runtime before it touches application state: a thread
//! that is not already inside blocks until the runtime is free, takes it, and
//! gives it back when the callback returns (or unwinds). A thread that is
//! already inside, because the callback fired synchronously from a native call
//! made under the runtime, just proceeds.
//!
//! Application code that must not interleave with callbacks holds a
//! [`RuntimeGuard`] from [`enter`]. The lock guarantees mutual exclusion only,
//! not FIFO fairness.

use std::cell::Cell;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

struct Coordinator {
    owner: Mutex<Option<ThreadId>>,
    released: Condvar,
}

static RUNTIME: Coordinator = Coordinator {
    owner: Mutex::new(None),
    released: Condvar::new(),
};

thread_local! {
    static ENTERED: Cell<bool> = const { Cell::new(false) };
}

impl Coordinator {
    fn acquire(&self) {
        let current = thread::current().id();
        let mut owner = self.owner.lock();
        while owner.is_some() {
            self.released.wait(&mut owner);
        }
        *owner = Some(current);
        ENTERED.with(|entered| entered.set(true));
    }

    fn release(&self) {
        let mut owner = self.owner.lock();
        debug_assert_eq!(*owner, Some(thread::current().id()));
        *owner = None;
        ENTERED.with(|entered| entered.set(false));
        drop(owner);
        self.released.notify_one();
    }
}

/// Whether the current thread is inside the runtime.
pub fn is_entered() -> bool {
    ENTERED.with(Cell::get)
}

/// Enter the runtime, blocking until no other thread is inside.
///
/// Re-entering from a thread that is already inside does not block and the
/// returned guard does nothing on drop.
pub fn enter() -> RuntimeGuard {
    if is_entered() {
        return RuntimeGuard {
            registered: false,
            _not_send: PhantomData,
        };
    }
    RUNTIME.acquire();
    trace!(thread = ?thread::current().id(), "entered runtime");
    RuntimeGuard {
        registered: true,
        _not_send: PhantomData,
    }
}

/// Run `f` with the runtime given up, for native calls that may block or
/// deliver callbacks on other threads.
///
/// When the current thread is not inside the runtime this just runs `f`.
pub fn blocking<R>(f: impl FnOnce() -> R) -> R {
    if !is_entered() {
        return f();
    }
    RUNTIME.release();
    let _reacquire = Reacquire;
    f()
}

/// Scope of one stay inside the runtime.
///
/// Dropping the guard leaves the runtime only if this guard was the one that
/// entered it; the original state of the thread is restored on every exit
/// path, unwinding included.
#[must_use = "the runtime is left as soon as the guard is dropped"]
pub struct RuntimeGuard {
    registered: bool,
    _not_send: PhantomData<*const ()>,
}

impl RuntimeGuard {
    /// Whether this guard performed the entry (and will perform the exit).
    pub fn registered(&self) -> bool {
        self.registered
    }
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        if self.registered {
            trace!(thread = ?thread::current().id(), "leaving runtime");
            RUNTIME.release();
        }
    }
}

struct Reacquire;

impl Drop for Reacquire {
    fn drop(&mut self) {
        RUNTIME.acquire();
    }
}
