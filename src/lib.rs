//! Safe bindings for libspotify.
//!
//! This crate wraps the libspotify C client library: every native object is
//! held by a typed handle ([`Session`], [`Track`], [`Search`], ...) with an
//! explicit `release`, and every native callback is dispatched into a
//! [`SessionCallbacks`] implementation.
//!
//! # Thread Safety
//!
//! libspotify calls back from its own threads. All callbacks, and every
//! completion of a search or browse, run while holding the process-wide
//! runtime lock (see [`runtime`]), so two callbacks never overlap. A thread
//! that already holds the lock may re-enter it. [`Session::process_events`]
//! gives the lock up while libspotify works.
//!
//! A panic inside a callback is logged and aborts the process: it never
//! unwinds into native code.
//!
//! # Memory Management
//!
//! - Handles own one native reference; `release` gives it back and is
//!   idempotent. Any accessor on a released handle fails with
//!   [`Error::NullHandle`] before reaching libspotify.
//! - Dropping a handle that was never released gives its reference back.
//! - Releasing a search or browse before it completes abandons it: the
//!   completion callback is not run.
//! - A session's callback registration lives until the native session has
//!   been released.
//! - Native calls hold their handle live: a release from another thread waits
//!   for calls and callbacks in flight, and later calls fail with
//!   [`Error::NullHandle`].
//! - Callbacks receive a view of the session that never releases it. A
//!   session release requested inside a callback runs once the callback has
//!   returned, outside of it.
//!
//! # Feature Flags
//!
//! - `libspotify`: link against the system libspotify and enable
//!   [`Session::create`]. Without it the crate builds against any
//!   [`native::Library`] passed to [`Session::create_with`].

#![allow(clippy::missing_safety_doc)]

mod browse;
mod callbacks;
mod config;
mod error;
mod handle;
mod lifecycle;
mod metadata;
pub mod native;
mod pending;
pub mod runtime;
mod search;
mod session;
mod track;
mod trampoline;
mod types;
mod util;

#[cfg(feature = "libspotify")]
mod libspotify;
#[cfg(feature = "libspotify")]
mod sys;

#[cfg(test)]
mod testing;

pub use browse::{AlbumBrowse, ArtistBrowse, ToplistBrowse};
pub use callbacks::{AudioFrames, NoCallbacks, SessionCallbacks};
pub use config::{API_VERSION, SessionConfig};
pub use error::{Error, ErrorCode, Result};
pub use handle::{HandleId, Kind};
#[cfg(feature = "libspotify")]
pub use libspotify::LibSpotify;
pub use lifecycle::Session;
pub use metadata::{Album, Artist, Image, Link, Playlist, PlaylistContainer, User};
pub use search::{Search, SearchQuery};
pub use track::Track;
pub use types::{
    AlbumType, ArtistBrowseType, AudioBufferStats, AudioFormat, Bitrate, ConnectionRule,
    ConnectionState, ConnectionType, ImageFormat, ImageId, LinkType, OfflineSyncStatus,
    RadioGenre, SampleType, ToplistRegion, ToplistType,
};

/// Crate version (e.g. "0.1.0").
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Feature flags bitmask.
///
/// - Bit 0 (0x01): `libspotify`, linked against the native library
pub fn features() -> u32 {
    let mut flags = 0u32;

    #[cfg(feature = "libspotify")]
    {
        flags |= 1 << 0;
    }

    flags
}
