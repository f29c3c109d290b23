//! Dispatch of native callbacks into application code.
//!
//! Every entry point here is called from a C-ABI shim on a libspotify thread.
//! Each one enters the runtime, recovers the session registration from the
//! user-data token, converts the native arguments and calls the matching
//! [`SessionCallbacks`] method. A panic in application code never unwinds
//! into the native library: it is logged and the process aborts.
//!
//! The session is held live for the whole callback, so a release on another
//! thread waits for it to return. Callbacks get a borrowed view of the
//! session that can never be the one to release it.

use std::any::Any;
use std::cell::Cell;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::slice;

use tracing::{debug, error, trace};

use crate::callbacks::{AudioFrames, SessionCallbacks};
use crate::error::ErrorCode;
use crate::lifecycle::{Session, SessionRegistration};
use crate::native::Userdata;
use crate::pending::Completion;
use crate::runtime;
use crate::types::{AudioBufferStats, AudioFormat};
use crate::util::copy_cstr;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Whether the current thread is running application callback code.
pub(crate) fn in_callback() -> bool {
    DEPTH.with(Cell::get) > 0
}

/// Marks the current thread as inside a callback until dropped.
pub(crate) struct Dispatch {
    _not_send: PhantomData<*const ()>,
}

impl Dispatch {
    pub(crate) fn begin() -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Log a panic that escaped a callback and abort.
pub(crate) fn fatal(event: &str, payload: Box<dyn Any + Send>) -> ! {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    error!(event, %message, "callback panicked; aborting");
    process::abort()
}

/// Run one session callback inside the runtime.
///
/// Returns `default` when the session is being released.
///
/// # Safety
///
/// `userdata` must be the registration token of a session whose native
/// object has not been released yet.
unsafe fn with_session<R>(
    userdata: Userdata,
    event: &'static str,
    default: R,
    f: impl FnOnce(&dyn SessionCallbacks, &Session) -> R,
) -> R {
    let _runtime = runtime::enter();
    trace!(event, "native callback");

    let registration = unsafe { SessionRegistration::from_userdata(userdata) };
    let Some((session, _live)) = registration.session() else {
        debug!(event, "callback for a released session dropped");
        return default;
    };

    let _dispatch = Dispatch::begin();
    match panic::catch_unwind(AssertUnwindSafe(|| f(registration.callbacks(), &session))) {
        Ok(value) => value,
        Err(payload) => fatal(event, payload),
    }
}

macro_rules! simple_events {
    ($($event:ident),* $(,)?) => {
        $(
            /// # Safety
            ///
            /// See [`with_session`].
            pub(crate) unsafe fn $event(userdata: Userdata) {
                unsafe {
                    with_session(userdata, stringify!($event), (), |callbacks, session| {
                        callbacks.$event(session)
                    })
                }
            }
        )*
    };
}

simple_events!(
    logged_out,
    metadata_updated,
    notify_main_thread,
    play_token_lost,
    end_of_track,
    userinfo_updated,
    start_playback,
    stop_playback,
    offline_status_updated,
);

macro_rules! error_events {
    ($($event:ident),* $(,)?) => {
        $(
            /// # Safety
            ///
            /// See [`with_session`].
            pub(crate) unsafe fn $event(userdata: Userdata, error: i32) {
                let error = ErrorCode::from_raw(error);
                unsafe {
                    with_session(userdata, stringify!($event), (), |callbacks, session| {
                        callbacks.$event(session, error)
                    })
                }
            }
        )*
    };
}

error_events!(logged_in, connection_error, streaming_error);

/// # Safety
///
/// See [`with_session`]; `message` must be null or a valid C string.
pub(crate) unsafe fn message_to_user(userdata: Userdata, message: *const c_char) {
    let message = unsafe { copy_cstr(message) }.unwrap_or_default();
    unsafe {
        with_session(userdata, "message_to_user", (), |callbacks, session| {
            callbacks.message_to_user(session, &message)
        })
    }
}

/// # Safety
///
/// See [`with_session`]; `message` must be null or a valid C string.
pub(crate) unsafe fn log_message(userdata: Userdata, message: *const c_char) {
    let message = unsafe { copy_cstr(message) }.unwrap_or_default();
    debug!(target: "spotify::native", "{}", message.trim_end());
    unsafe {
        with_session(userdata, "log_message", (), |callbacks, session| {
            callbacks.log_message(session, &message)
        })
    }
}

/// Forward delivered audio. The return value is the number of frames the
/// application consumed, passed back unchanged.
///
/// # Safety
///
/// See [`with_session`]; `frames` must be null or point to `num_frames`
/// frames of `format` that stay valid for the duration of the call.
pub(crate) unsafe fn music_delivery(
    userdata: Userdata,
    format: AudioFormat,
    frames: *const c_void,
    num_frames: i32,
) -> i32 {
    let count = usize::try_from(num_frames).unwrap_or(0);
    let bytes: &[u8] = match format.frame_size() {
        Some(size) if !frames.is_null() && count > 0 => {
            unsafe { slice::from_raw_parts(frames.cast::<u8>(), count * size) }
        }
        _ => &[],
    };
    let view = AudioFrames::new(bytes, count);

    let consumed = unsafe {
        with_session(userdata, "music_delivery", 0, |callbacks, session| {
            callbacks.music_delivery(session, format, view)
        })
    };
    i32::try_from(consumed).unwrap_or(i32::MAX)
}

/// # Safety
///
/// See [`with_session`].
pub(crate) unsafe fn audio_buffer_stats(userdata: Userdata) -> AudioBufferStats {
    unsafe {
        with_session(
            userdata,
            "get_audio_buffer_stats",
            AudioBufferStats::default(),
            |callbacks, session| callbacks.get_audio_buffer_stats(session),
        )
    }
}

/// Completion of a search or browse request.
///
/// # Safety
///
/// `userdata` must be the share handed out by `Completion::<T>::share` and
/// must not be used again.
pub(crate) unsafe fn request_complete<T: Clone + Send + 'static>(userdata: Userdata) {
    unsafe { Completion::<T>::complete(userdata) }
}
