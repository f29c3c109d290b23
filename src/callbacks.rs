//! Session events the application reacts to.
//!
//! One method per native event kind, bound once at session creation. All
//! methods have a default so an application implements only what it needs.
//! Methods run on whichever thread libspotify delivers the event from, always
//! inside the runtime (see [`crate::runtime`]).

use crate::error::ErrorCode;
use crate::lifecycle::Session;
use crate::types::{AudioBufferStats, AudioFormat};

/// Callback-dispatch object supplied at session creation.
#[allow(unused_variables)]
pub trait SessionCallbacks: Send + Sync + 'static {
    /// Login finished; `error` is `ErrorCode::Ok` on success.
    fn logged_in(&self, session: &Session, error: ErrorCode) {}

    fn logged_out(&self, session: &Session) {}

    /// Metadata of some loaded object changed.
    fn metadata_updated(&self, session: &Session) {}

    fn connection_error(&self, session: &Session, error: ErrorCode) {}

    /// A message from the service that should be shown to the user.
    fn message_to_user(&self, session: &Session, message: &str) {}

    /// `Session::process_events` should be called from the main loop soon.
    fn notify_main_thread(&self, session: &Session) {}

    /// Audio data is available.
    ///
    /// Returns the number of frames consumed; fewer than delivered (zero
    /// included) makes libspotify deliver the rest again later. The default
    /// discards everything.
    fn music_delivery(&self, session: &Session, format: AudioFormat, frames: AudioFrames<'_>) -> usize {
        frames.num_frames()
    }

    /// Another client started playing on this account.
    fn play_token_lost(&self, session: &Session) {}

    /// Diagnostic line from libspotify.
    fn log_message(&self, session: &Session, message: &str) {}

    fn end_of_track(&self, session: &Session) {}

    fn streaming_error(&self, session: &Session, error: ErrorCode) {}

    fn userinfo_updated(&self, session: &Session) {}

    fn start_playback(&self, session: &Session) {}

    fn stop_playback(&self, session: &Session) {}

    /// Current state of the application's audio buffer.
    fn get_audio_buffer_stats(&self, session: &Session) -> AudioBufferStats {
        AudioBufferStats::default()
    }

    fn offline_status_updated(&self, session: &Session) {}
}

/// Callbacks that ignore every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallbacks;

impl SessionCallbacks for NoCallbacks {}

/// Borrowed view of delivered audio.
///
/// The bytes stay owned by libspotify and are only valid for the duration of
/// the callback; copy them out to keep them.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrames<'a> {
    bytes: &'a [u8],
    num_frames: usize,
}

impl<'a> AudioFrames<'a> {
    pub(crate) fn new(bytes: &'a [u8], num_frames: usize) -> Self {
        Self { bytes, num_frames }
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Raw interleaved sample bytes. Empty when the sample type is unknown.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames == 0
    }

    /// Interleaved 16-bit samples in native endianness.
    pub fn samples(&self) -> impl Iterator<Item = i16> + 'a {
        self.bytes
            .chunks_exact(2)
            .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]))
    }
}
