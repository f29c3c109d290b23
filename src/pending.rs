//! Completion records for asynchronous requests (search, browse).
//!
//! A request hands libspotify one `Arc` share of its [`Completion`] as
//! user-data; the share is reclaimed exactly once, when libspotify signals
//! completion. While pending, the record pins the request's wrapper so the
//! application may drop its own copy and still get the callback.
//!
//! Releasing the wrapper before completion abandons the request: the pending
//! callback and the pin are dropped, and a completion that still arrives
//! finds a valid, inert record.

use std::ffi::c_void;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Error, ErrorCode, Result};
use crate::handle::{Kind, RawHandle};
use crate::native::{Library, NativePtr, Userdata};
use crate::runtime;
use crate::trampoline;

/// Callback run once the request has completed.
pub(crate) type OnComplete<T> = Box<dyn FnOnce(&T) + Send + 'static>;

enum State<T> {
    /// Request issued, wrapper not built yet.
    Armed(OnComplete<T>),
    /// Completion arrived before the wrapper was built.
    Early(OnComplete<T>),
    /// Waiting for completion, wrapper pinned.
    Pinned { target: T, callback: OnComplete<T> },
    Delivered,
    Abandoned,
}

pub(crate) struct Completion<T> {
    kind: Kind,
    state: Mutex<State<T>>,
}

impl<T: Clone + Send + 'static> Completion<T> {
    pub(crate) fn new(kind: Kind, callback: OnComplete<T>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            state: Mutex::new(State::Armed(callback)),
        })
    }

    /// Hand one share of the record to the native library.
    pub(crate) fn share(self: &Arc<Self>) -> Userdata {
        Userdata::new(Arc::into_raw(self.clone()) as *mut c_void)
    }

    /// Take back the share of a request the native library refused.
    ///
    /// # Safety
    ///
    /// `userdata` must come from [`Completion::share`] on a record of the same
    /// type, and the native library must not hold on to it.
    pub(crate) unsafe fn reclaim(userdata: Userdata) {
        drop(unsafe { Arc::from_raw(userdata.as_ptr() as *const Self) });
    }

    /// Attach the freshly built wrapper.
    ///
    /// Delivers right away if the completion already arrived.
    pub(crate) fn pin(&self, target: &T) {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, State::Delivered) {
            State::Armed(callback) => {
                *state = State::Pinned {
                    target: target.clone(),
                    callback,
                };
            }
            State::Early(callback) => {
                drop(state);
                trace!(kind = %self.kind, "completion arrived during creation");
                self.deliver(target, callback);
            }
            other => *state = other,
        }
    }

    /// Drop the pending callback and the pin.
    pub(crate) fn abandon(&self) {
        let previous = {
            let mut state = self.state.lock();
            match &*state {
                State::Delivered | State::Abandoned => return,
                _ => mem::replace(&mut *state, State::Abandoned),
            }
        };
        debug!(kind = %self.kind, "pending request abandoned");
        drop(previous);
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(
            &*self.state.lock(),
            State::Armed(_) | State::Early(_) | State::Pinned { .. }
        )
    }

    /// Completion signaled by the native library. Consumes its share.
    ///
    /// # Safety
    ///
    /// `userdata` must come from [`Completion::share`] on a record of the same
    /// type and must not be used again.
    pub(crate) unsafe fn complete(userdata: Userdata) {
        let completion = unsafe { Arc::from_raw(userdata.as_ptr() as *const Self) };
        let _runtime = runtime::enter();

        let mut state = completion.state.lock();
        match mem::replace(&mut *state, State::Delivered) {
            State::Pinned { target, callback } => {
                drop(state);
                completion.deliver(&target, callback);
                // Unpinning may drop the last wrapper.
                drop(target);
            }
            State::Armed(callback) => *state = State::Early(callback),
            State::Abandoned => {
                *state = State::Abandoned;
                debug!(kind = %completion.kind, "completion for a released request ignored");
            }
            previous @ (State::Early(_) | State::Delivered) => {
                *state = previous;
                warn!(kind = %completion.kind, "duplicate completion ignored");
            }
        }
    }

    fn deliver(&self, target: &T, callback: OnComplete<T>) {
        let _runtime = runtime::enter();
        let _dispatch = trampoline::Dispatch::begin();
        trace!(kind = %self.kind, "delivering completion");
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(target))) {
            trampoline::fatal(self.kind.name(), payload);
        }
    }
}

/// Native reference of an asynchronous request plus its completion record.
pub(crate) struct Request<T> {
    pub(crate) raw: RawHandle,
    completion: Arc<Completion<T>>,
}

impl<T: Clone + Send + 'static> Request<T> {
    /// Release the native object and abandon a pending completion.
    pub(crate) fn release(&self) {
        self.raw.release();
        self.completion.abandon();
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.completion.is_pending()
    }

    pub(crate) fn load_error(&self) -> Result<ErrorCode> {
        let kind = self.raw.kind();
        self.raw.with(|lib, ptr| lib.load_error(kind, ptr))
    }
}

/// Issue an asynchronous request and build its wrapper.
///
/// `create` performs the native call with the user-data token, holding the
/// handles it needs live only for that call; `build` wraps the resulting
/// request. The completion callback is delivered exactly once, even when
/// libspotify signals completion before `create` returns.
pub(crate) fn issue<T: Clone + Send + 'static>(
    kind: Kind,
    operation: &'static str,
    library: Arc<dyn Library>,
    callback: OnComplete<T>,
    create: impl FnOnce(&dyn Library, Userdata) -> Result<Option<NativePtr>>,
    build: impl FnOnce(Arc<Request<T>>) -> T,
) -> Result<T> {
    let completion = Completion::new(kind, callback);
    let userdata = completion.share();

    let ptr = match create(library.as_ref(), userdata) {
        Ok(Some(ptr)) => ptr,
        // No object means no completion will ever be signaled.
        Ok(None) => {
            unsafe { Completion::<T>::reclaim(userdata) };
            return Err(Error::NativeNull { operation });
        }
        Err(err) => {
            unsafe { Completion::<T>::reclaim(userdata) };
            return Err(err);
        }
    };

    let target = build(Arc::new(Request {
        raw: RawHandle::wrap(kind, library, ptr),
        completion: completion.clone(),
    }));
    completion.pin(&target);
    Ok(target)
}

/// Define the wrapper of an asynchronous request (search, browse).
macro_rules! request_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            inner: std::sync::Arc<$crate::pending::Request<$name>>,
        }

        impl $name {
            /// Whether the result has been fully loaded.
            pub fn is_loaded(&self) -> $crate::error::Result<bool> {
                self.inner.raw.is_loaded()
            }

            /// Error the request completed with.
            pub fn error(&self) -> $crate::error::Result<$crate::error::ErrorCode> {
                self.inner.load_error()
            }

            /// Whether the completion callback is still outstanding.
            pub fn is_pending(&self) -> bool {
                self.inner.is_pending()
            }

            /// Release the native object.
            ///
            /// A request still pending is abandoned: its callback is dropped
            /// without running. Releasing twice is a no-op.
            pub fn release(&self) {
                self.inner.release();
            }

            pub fn is_released(&self) -> bool {
                self.inner.raw.is_null()
            }

            pub fn id(&self) -> Option<$crate::handle::HandleId> {
                self.inner.raw.id()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.inner.raw == other.inner.raw
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.inner.raw, f)
            }
        }
    };
}

pub(crate) use request_handle;
