//! The boundary with the wrapped native library.
//!
//! Everything above this module works with [`NativePtr`] addresses and the
//! [`Library`] trait; nothing above it dereferences a native pointer. The
//! real implementation lives in `libspotify.rs` (feature `libspotify`), the
//! test double in `testing.rs`.

use std::ffi::{CStr, CString, c_void};
use std::fmt;
use std::ptr::NonNull;

use crate::error::ErrorCode;
use crate::handle::Kind;
use crate::types::{
    AlbumType, ArtistBrowseType, Bitrate, ConnectionState, ConnectionType, ImageFormat, ImageId,
    LinkType, OfflineSyncStatus, ToplistType,
};

/// Address of an object owned by the native library.
///
/// Opaque: it is only ever handed back to the library that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativePtr(NonNull<c_void>);

// SAFETY: the address is never dereferenced on this side; the native library
// serializes access to its own objects.
unsafe impl Send for NativePtr {}
unsafe impl Sync for NativePtr {}

impl NativePtr {
    /// Returns `None` for a null pointer.
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }

    #[cfg_attr(not(feature = "libspotify"), allow(dead_code))]
    pub(crate) fn cast<T>(self) -> *mut T {
        self.0.as_ptr().cast()
    }
}

impl fmt::Debug for NativePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativePtr({:#x})", self.addr())
    }
}

/// Token handed to the native library at registration time and passed back,
/// unchanged, to every callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Userdata(*mut c_void);

// SAFETY: the token is only turned back into a reference by the trampolines,
// which own the contract on the pointee.
unsafe impl Send for Userdata {}
unsafe impl Sync for Userdata {}

impl Userdata {
    pub fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }
}

/// Indexed child collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    Tracks,
    Albums,
    Artists,
    SimilarArtists,
    Playlists,
    Friends,
}

/// Single related objects reachable from another object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Album,
    Artist,
    Track,
    User,
    Container,
}

/// Boolean track properties that depend on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackFlag {
    Available,
    Local,
    Autolinked,
    Starred,
}

/// Session configuration marshaled for the native call.
#[derive(Debug, Clone)]
pub struct NativeConfig {
    pub api_version: i32,
    pub cache_location: CString,
    pub settings_location: CString,
    pub application_key: Vec<u8>,
    pub user_agent: CString,
    pub compress_playlists: bool,
    pub dont_save_metadata_for_playlists: bool,
    pub initially_unload_playlists: bool,
    pub device_id: Option<CString>,
    pub tracefile: Option<CString>,
}

/// Search request marshaled for the native call.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: CString,
    pub track_offset: i32,
    pub track_count: i32,
    pub album_offset: i32,
    pub album_count: i32,
    pub artist_offset: i32,
    pub artist_count: i32,
}

/// The wrapped native library.
///
/// Ownership contract, mirrored from libspotify:
/// - `*_create` methods return a fresh reference owned by the caller;
/// - `item` and `related` return borrowed references, the caller must
///   `add_ref` before keeping them;
/// - `release` gives one reference back and may free the object.
///
/// The `Kind` passed in always matches the object's real kind.
pub trait Library: Send + Sync + 'static {
    fn error_message(&self, code: ErrorCode) -> String;

    fn add_ref(&self, kind: Kind, ptr: NativePtr);
    fn release(&self, kind: Kind, ptr: NativePtr);

    fn is_loaded(&self, kind: Kind, ptr: NativePtr) -> bool;
    fn load_error(&self, kind: Kind, ptr: NativePtr) -> ErrorCode;
    fn name(&self, kind: Kind, ptr: NativePtr) -> Option<String>;
    fn count(&self, kind: Kind, ptr: NativePtr, item: Item) -> i32;
    fn item(&self, kind: Kind, ptr: NativePtr, item: Item, index: i32) -> Option<NativePtr>;
    fn related(&self, kind: Kind, ptr: NativePtr, relation: Relation) -> Option<NativePtr>;

    // Session
    fn session_create(&self, config: &NativeConfig, userdata: Userdata)
    -> Result<NativePtr, ErrorCode>;
    fn session_login(&self, session: NativePtr, username: &CStr, password: &CStr, remember_me: bool);
    fn session_relogin(&self, session: NativePtr) -> ErrorCode;
    fn session_remembered_user(&self, session: NativePtr) -> Option<String>;
    fn session_forget_me(&self, session: NativePtr);
    fn session_logout(&self, session: NativePtr);
    fn session_connection_state(&self, session: NativePtr) -> ConnectionState;
    fn session_set_cache_size(&self, session: NativePtr, megabytes: usize);
    /// Returns the number of milliseconds until the next call is due.
    fn session_process_events(&self, session: NativePtr) -> i32;
    fn session_inbox_create(&self, session: NativePtr) -> Option<NativePtr>;
    fn session_starred_create(&self, session: NativePtr) -> Option<NativePtr>;
    fn session_starred_for_user_create(&self, session: NativePtr, username: &CStr)
    -> Option<NativePtr>;
    fn session_published_container_for_user_create(
        &self,
        session: NativePtr,
        username: Option<&CStr>,
    ) -> Option<NativePtr>;
    fn session_preferred_bitrate(&self, session: NativePtr, bitrate: Bitrate);
    fn session_preferred_offline_bitrate(&self, session: NativePtr, bitrate: Bitrate, allow_resync: bool);
    fn session_set_connection_type(&self, session: NativePtr, connection_type: ConnectionType);
    fn session_set_connection_rules(&self, session: NativePtr, rules: u32);
    fn session_user_country(&self, session: NativePtr) -> i32;

    // Player
    fn player_load(&self, session: NativePtr, track: NativePtr) -> ErrorCode;
    fn player_seek(&self, session: NativePtr, offset_ms: i32);
    fn player_play(&self, session: NativePtr, play: bool);
    fn player_unload(&self, session: NativePtr);
    fn player_prefetch(&self, session: NativePtr, track: NativePtr) -> ErrorCode;

    // Offline sync
    fn offline_tracks_to_sync(&self, session: NativePtr) -> i32;
    fn offline_num_playlists(&self, session: NativePtr) -> i32;
    fn offline_sync_status(&self, session: NativePtr) -> Option<OfflineSyncStatus>;
    /// Seconds until the offline key expires.
    fn offline_time_left(&self, session: NativePtr) -> i32;

    // Track
    fn track_flag(&self, session: NativePtr, track: NativePtr, flag: TrackFlag) -> bool;
    fn track_set_starred(&self, session: NativePtr, tracks: &[NativePtr], star: bool);
    fn track_duration(&self, track: NativePtr) -> i32;
    fn track_popularity(&self, track: NativePtr) -> i32;
    fn track_disc(&self, track: NativePtr) -> i32;
    fn track_index(&self, track: NativePtr) -> i32;
    fn localtrack_create(&self, artist: &CStr, title: &CStr, album: &CStr, length_ms: i32)
    -> Option<NativePtr>;

    // Album
    fn album_is_available(&self, album: NativePtr) -> bool;
    fn album_year(&self, album: NativePtr) -> i32;
    fn album_type(&self, album: NativePtr) -> AlbumType;
    fn album_cover(&self, album: NativePtr) -> Option<ImageId>;

    // User
    fn user_canonical_name(&self, user: NativePtr) -> Option<String>;
    fn user_display_name(&self, user: NativePtr) -> Option<String>;

    // Link
    fn link_create_from_string(&self, link: &CStr) -> Option<NativePtr>;
    /// Link to a track (with an offset), album or artist.
    fn link_create_from(&self, kind: Kind, ptr: NativePtr, offset_ms: i32) -> Option<NativePtr>;
    fn link_type(&self, link: NativePtr) -> LinkType;
    fn link_as_string(&self, link: NativePtr) -> Option<String>;

    // Image
    fn image_create(&self, session: NativePtr, id: &ImageId) -> Option<NativePtr>;
    fn image_format(&self, image: NativePtr) -> ImageFormat;
    fn image_data(&self, image: NativePtr) -> Vec<u8>;
    fn image_id(&self, image: NativePtr) -> Option<ImageId>;

    // Search
    fn search_create(&self, session: NativePtr, params: &SearchParams, userdata: Userdata)
    -> Option<NativePtr>;
    fn radio_search_create(
        &self,
        session: NativePtr,
        from_year: u32,
        to_year: u32,
        genres: u32,
        userdata: Userdata,
    ) -> Option<NativePtr>;
    fn search_query(&self, search: NativePtr) -> String;
    fn search_did_you_mean(&self, search: NativePtr) -> String;
    fn search_total(&self, search: NativePtr, item: Item) -> i32;

    // Browse
    fn albumbrowse_create(&self, session: NativePtr, album: NativePtr, userdata: Userdata)
    -> Option<NativePtr>;
    fn albumbrowse_review(&self, browse: NativePtr) -> String;
    fn artistbrowse_create(
        &self,
        session: NativePtr,
        artist: NativePtr,
        browse_type: ArtistBrowseType,
        userdata: Userdata,
    ) -> Option<NativePtr>;
    fn artistbrowse_biography(&self, browse: NativePtr) -> String;
    fn toplistbrowse_create(
        &self,
        session: NativePtr,
        toplist_type: ToplistType,
        region: i32,
        username: Option<&CStr>,
        userdata: Userdata,
    ) -> Option<NativePtr>;
}
