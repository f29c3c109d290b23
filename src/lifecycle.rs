//! Session lifecycle management (create, release).

use std::ffi::c_void;
use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::callbacks::SessionCallbacks;
use crate::config::SessionConfig;
use crate::error::{Error, ErrorCode, Result};
use crate::handle::{HandleId, Kind, Live, RawHandle};
use crate::native::{Library, Userdata};
use crate::runtime;
use crate::trampoline;

/// A libspotify session.
///
/// Cloning is cheap and shares the same native session. The native session
/// is released by [`Session::release`] or, as a backstop, when the last clone
/// is dropped.
///
/// The session passed to a callback is a borrowed view: clones of it follow
/// the session but do not keep it alive. A release requested from inside a
/// callback, explicit or by dropping the last clone, is carried out outside
/// callbacks: when [`Session::process_events`] returns, or by the next
/// `release` of any clone or view.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
    owner: Option<Arc<Owner>>,
}

/// Shared by the application's clones; the last one dropped releases.
struct Owner(Arc<SessionInner>);

impl Drop for Owner {
    fn drop(&mut self) {
        self.0.release();
    }
}

struct SessionInner {
    raw: RawHandle,
    registration: Mutex<Option<Box<SessionRegistration>>>,
}

/// Sessions whose release was requested from inside a callback.
static DEFERRED: Mutex<Vec<Arc<SessionInner>>> = Mutex::new(Vec::new());

/// The session's callback registration, passed to libspotify as user-data.
///
/// Lives at a stable heap address from before the native session is created
/// until after it has been released, so every callback libspotify can still
/// make finds it. It pins the session state for as long.
pub(crate) struct SessionRegistration {
    session: Arc<SessionInner>,
    callbacks: Arc<dyn SessionCallbacks>,
}

impl SessionRegistration {
    fn userdata(&self) -> Userdata {
        Userdata::new(self as *const Self as *mut c_void)
    }

    /// # Safety
    ///
    /// `userdata` must be the token registered for a session whose native
    /// object has not been released yet.
    pub(crate) unsafe fn from_userdata<'a>(userdata: Userdata) -> &'a Self {
        unsafe { &*(userdata.as_ptr() as *const Self) }
    }

    /// A view of the session plus its native object held live, unless a
    /// release has begun.
    pub(crate) fn session(&self) -> Option<(Session, Live<'_>)> {
        let live = self.session.raw.get().ok()?;
        let view = Session {
            inner: self.session.clone(),
            owner: None,
        };
        Some((view, live))
    }

    pub(crate) fn callbacks(&self) -> &dyn SessionCallbacks {
        self.callbacks.as_ref()
    }
}

impl SessionInner {
    fn release(self: &Arc<Self>) {
        let first = self.raw.retire();
        if trampoline::in_callback() {
            if first {
                debug!("session release from a callback deferred");
                DEFERRED.lock().push(self.clone());
            }
            return;
        }
        self.finish();
    }

    /// Release the native session, or wait for whoever is releasing it.
    fn finish(&self) {
        let mut slot = match self.registration.try_lock() {
            Some(slot) => slot,
            None => runtime::blocking(|| self.registration.lock()),
        };
        // Only the caller that actually released the native session may free
        // the registration: libspotify can still call back until then.
        if self.raw.reclaim() {
            let registration = slot.take();
            drop(slot);
            drop(registration);
            debug!("session registration freed");
        }
    }
}

impl Session {
    /// Create a session backed by the system libspotify.
    ///
    /// # Errors
    ///
    /// `Error::Native { operation: "session_create", .. }` with the code
    /// libspotify reported (bad application key, unusable cache location, ...).
    #[cfg(feature = "libspotify")]
    pub fn create(config: &SessionConfig, callbacks: impl SessionCallbacks) -> Result<Session> {
        Self::create_with(
            Arc::new(crate::libspotify::LibSpotify::new()),
            config,
            Arc::new(callbacks),
        )
    }

    /// Create a session on an explicit native library.
    pub fn create_with(
        library: Arc<dyn Library>,
        config: &SessionConfig,
        callbacks: Arc<dyn SessionCallbacks>,
    ) -> Result<Session> {
        let native = config.to_native()?;

        // The registration has to exist before libspotify does, callbacks can
        // fire from inside session creation.
        let inner = Arc::new(SessionInner {
            raw: RawHandle::null(Kind::Session, library.clone()),
            registration: Mutex::new(None),
        });
        let registration = Box::new(SessionRegistration {
            session: inner.clone(),
            callbacks,
        });
        let userdata = registration.userdata();
        *inner.registration.lock() = Some(registration);

        match library.session_create(&native, userdata) {
            Ok(ptr) => {
                inner.raw.install(ptr);
                info!(?ptr, api_version = native.api_version, "session created");
                Ok(Session {
                    owner: Some(Arc::new(Owner(inner.clone()))),
                    inner,
                })
            }
            Err(code) => {
                warn!(%code, "session_create failed");
                inner.registration.lock().take();
                Err(Error::Native {
                    operation: "session_create",
                    code,
                })
            }
        }
    }

    /// Release the native session and its callback registration.
    ///
    /// Every later operation fails with `Error::NullHandle`; releasing twice
    /// is a no-op. Other clones observe the release. Waits for calls and
    /// callbacks in flight on other threads. From inside a callback the
    /// native release is deferred: see [`Session`].
    pub fn release(&self) {
        self.inner.release();
    }

    pub fn is_released(&self) -> bool {
        self.inner.raw.is_null()
    }

    pub fn id(&self) -> Option<HandleId> {
        self.inner.raw.id()
    }

    /// Human-readable message for a native error code.
    pub fn error_message(&self, code: ErrorCode) -> String {
        self.inner.raw.library().error_message(code)
    }

    pub(crate) fn raw(&self) -> &RawHandle {
        &self.inner.raw
    }

    /// The native session, held live until the guard is dropped.
    pub(crate) fn ptr(&self) -> Result<Live<'_>> {
        self.inner.raw.get()
    }

    pub(crate) fn library(&self) -> &Arc<dyn Library> {
        self.inner.raw.library()
    }

    /// Carry out releases requested from inside callbacks, this session's
    /// included.
    pub(crate) fn release_deferred(&self) {
        if trampoline::in_callback() {
            return;
        }
        let pending = mem::take(&mut *DEFERRED.lock());
        for inner in pending {
            inner.finish();
        }
        if self.inner.raw.is_null() {
            self.inner.finish();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_view(&self) -> bool {
        self.owner.is_none()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.inner.raw == other.inner.raw
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner.raw, f)
    }
}
