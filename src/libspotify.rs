//! [`Library`] implementation backed by the system libspotify.
//!
//! Native callbacks land in the `extern "C"` shims below, which recover the
//! user-data token and hand over to [`crate::trampoline`]. Combinations of
//! kind and accessor that libspotify has no function for are logged and
//! answered with an empty value.

use std::ffi::{CStr, c_void};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use tracing::warn;

use crate::browse::{AlbumBrowse, ArtistBrowse, ToplistBrowse};
use crate::error::ErrorCode;
use crate::handle::Kind;
use crate::native::{
    Item, Library, NativeConfig, NativePtr, Relation, SearchParams, TrackFlag, Userdata,
};
use crate::search::Search;
use crate::sys;
use crate::trampoline;
use crate::types::{
    AlbumType, ArtistBrowseType, AudioFormat, Bitrate, ConnectionState, ConnectionType,
    ImageFormat, ImageId, LinkType, OfflineSyncStatus, SampleType, ToplistType,
};
use crate::util::copy_cstr;

/// The system libspotify, linked at build time.
#[derive(Debug, Default)]
pub struct LibSpotify {
    _private: (),
}

impl LibSpotify {
    pub fn new() -> Self {
        Self::default()
    }
}

fn wrap<T>(ptr: *mut T) -> Option<NativePtr> {
    NativePtr::new(ptr.cast())
}

fn unsupported(operation: &'static str, kind: Kind) {
    warn!(operation, %kind, "no native accessor for this kind");
}

fn optional(value: &Option<impl AsRef<CStr>>) -> *const c_char {
    value.as_ref().map_or(ptr::null(), |s| s.as_ref().as_ptr())
}

/// Read a string the library copies into a caller buffer, growing the
/// buffer until it fits. `fill` returns the full length, negative for none.
fn read_into_buffer(mut fill: impl FnMut(*mut c_char, usize) -> c_int) -> Option<String> {
    let mut buffer = vec![0u8; 256];
    loop {
        let len = usize::try_from(fill(buffer.as_mut_ptr().cast(), buffer.len())).ok()?;
        if len < buffer.len() {
            buffer.truncate(len);
            return Some(String::from_utf8_lossy(&buffer).into_owned());
        }
        buffer.resize(len + 1, 0);
    }
}

unsafe fn image_id_at(bytes: *const sys::sp_byte) -> Option<ImageId> {
    if bytes.is_null() {
        return None;
    }
    ImageId::from_slice(unsafe { slice::from_raw_parts(bytes, ImageId::LEN) })
}

impl Library for LibSpotify {
    fn error_message(&self, code: ErrorCode) -> String {
        unsafe { copy_cstr(sys::sp_error_message(code.as_raw())) }.unwrap_or_else(|| code.to_string())
    }

    fn add_ref(&self, kind: Kind, ptr: NativePtr) {
        unsafe {
            match kind {
                // Sessions are not reference counted.
                Kind::Session => {}
                Kind::Track => sys::sp_track_add_ref(ptr.cast()),
                Kind::Album => sys::sp_album_add_ref(ptr.cast()),
                Kind::Artist => sys::sp_artist_add_ref(ptr.cast()),
                Kind::AlbumBrowse => sys::sp_albumbrowse_add_ref(ptr.cast()),
                Kind::ArtistBrowse => sys::sp_artistbrowse_add_ref(ptr.cast()),
                Kind::ToplistBrowse => sys::sp_toplistbrowse_add_ref(ptr.cast()),
                Kind::Search => sys::sp_search_add_ref(ptr.cast()),
                Kind::Link => sys::sp_link_add_ref(ptr.cast()),
                Kind::Image => sys::sp_image_add_ref(ptr.cast()),
                Kind::User => sys::sp_user_add_ref(ptr.cast()),
                Kind::Playlist => sys::sp_playlist_add_ref(ptr.cast()),
                Kind::PlaylistContainer => sys::sp_playlistcontainer_add_ref(ptr.cast()),
            }
        }
    }

    fn release(&self, kind: Kind, ptr: NativePtr) {
        unsafe {
            match kind {
                Kind::Session => sys::sp_session_release(ptr.cast()),
                Kind::Track => sys::sp_track_release(ptr.cast()),
                Kind::Album => sys::sp_album_release(ptr.cast()),
                Kind::Artist => sys::sp_artist_release(ptr.cast()),
                Kind::AlbumBrowse => sys::sp_albumbrowse_release(ptr.cast()),
                Kind::ArtistBrowse => sys::sp_artistbrowse_release(ptr.cast()),
                Kind::ToplistBrowse => sys::sp_toplistbrowse_release(ptr.cast()),
                Kind::Search => sys::sp_search_release(ptr.cast()),
                Kind::Link => sys::sp_link_release(ptr.cast()),
                Kind::Image => sys::sp_image_release(ptr.cast()),
                Kind::User => sys::sp_user_release(ptr.cast()),
                Kind::Playlist => sys::sp_playlist_release(ptr.cast()),
                Kind::PlaylistContainer => sys::sp_playlistcontainer_release(ptr.cast()),
            }
        }
    }

    fn is_loaded(&self, kind: Kind, ptr: NativePtr) -> bool {
        unsafe {
            match kind {
                Kind::Session | Kind::Link => true,
                Kind::Track => sys::sp_track_is_loaded(ptr.cast()),
                Kind::Album => sys::sp_album_is_loaded(ptr.cast()),
                Kind::Artist => sys::sp_artist_is_loaded(ptr.cast()),
                Kind::AlbumBrowse => sys::sp_albumbrowse_is_loaded(ptr.cast()),
                Kind::ArtistBrowse => sys::sp_artistbrowse_is_loaded(ptr.cast()),
                Kind::ToplistBrowse => sys::sp_toplistbrowse_is_loaded(ptr.cast()),
                Kind::Search => sys::sp_search_is_loaded(ptr.cast()),
                Kind::Image => sys::sp_image_is_loaded(ptr.cast()),
                Kind::User => sys::sp_user_is_loaded(ptr.cast()),
                Kind::Playlist => sys::sp_playlist_is_loaded(ptr.cast()),
                Kind::PlaylistContainer => sys::sp_playlistcontainer_is_loaded(ptr.cast()),
            }
        }
    }

    fn load_error(&self, kind: Kind, ptr: NativePtr) -> ErrorCode {
        let raw = unsafe {
            match kind {
                Kind::Track => sys::sp_track_error(ptr.cast()),
                Kind::AlbumBrowse => sys::sp_albumbrowse_error(ptr.cast()),
                Kind::ArtistBrowse => sys::sp_artistbrowse_error(ptr.cast()),
                Kind::ToplistBrowse => sys::sp_toplistbrowse_error(ptr.cast()),
                Kind::Search => sys::sp_search_error(ptr.cast()),
                Kind::Image => sys::sp_image_error(ptr.cast()),
                _ => {
                    unsupported("load_error", kind);
                    0
                }
            }
        };
        ErrorCode::from_raw(raw)
    }

    fn name(&self, kind: Kind, ptr: NativePtr) -> Option<String> {
        let name = unsafe {
            match kind {
                Kind::Track => sys::sp_track_name(ptr.cast()),
                Kind::Album => sys::sp_album_name(ptr.cast()),
                Kind::Artist => sys::sp_artist_name(ptr.cast()),
                Kind::Playlist => sys::sp_playlist_name(ptr.cast()),
                Kind::User => sys::sp_user_display_name(ptr.cast()),
                _ => {
                    unsupported("name", kind);
                    ptr::null()
                }
            }
        };
        unsafe { copy_cstr(name) }
    }

    fn count(&self, kind: Kind, ptr: NativePtr, item: Item) -> i32 {
        unsafe {
            match (kind, item) {
                (Kind::Session, Item::Friends) => sys::sp_session_num_friends(ptr.cast()),
                (Kind::Track, Item::Artists) => sys::sp_track_num_artists(ptr.cast()),
                (Kind::Search, Item::Tracks) => sys::sp_search_num_tracks(ptr.cast()),
                (Kind::Search, Item::Albums) => sys::sp_search_num_albums(ptr.cast()),
                (Kind::Search, Item::Artists) => sys::sp_search_num_artists(ptr.cast()),
                (Kind::AlbumBrowse, Item::Tracks) => sys::sp_albumbrowse_num_tracks(ptr.cast()),
                (Kind::ArtistBrowse, Item::Tracks) => sys::sp_artistbrowse_num_tracks(ptr.cast()),
                (Kind::ArtistBrowse, Item::Albums) => sys::sp_artistbrowse_num_albums(ptr.cast()),
                (Kind::ArtistBrowse, Item::SimilarArtists) => {
                    sys::sp_artistbrowse_num_similar_artists(ptr.cast())
                }
                (Kind::ToplistBrowse, Item::Tracks) => sys::sp_toplistbrowse_num_tracks(ptr.cast()),
                (Kind::ToplistBrowse, Item::Albums) => sys::sp_toplistbrowse_num_albums(ptr.cast()),
                (Kind::ToplistBrowse, Item::Artists) => {
                    sys::sp_toplistbrowse_num_artists(ptr.cast())
                }
                (Kind::Playlist, Item::Tracks) => sys::sp_playlist_num_tracks(ptr.cast()),
                (Kind::PlaylistContainer, Item::Playlists) => {
                    sys::sp_playlistcontainer_num_playlists(ptr.cast())
                }
                _ => {
                    unsupported("count", kind);
                    0
                }
            }
        }
    }

    fn item(&self, kind: Kind, ptr: NativePtr, item: Item, index: i32) -> Option<NativePtr> {
        // libspotify does not range-check indices.
        if index < 0 || index >= self.count(kind, ptr, item) {
            return None;
        }
        unsafe {
            match (kind, item) {
                (Kind::Session, Item::Friends) => wrap(sys::sp_session_friend(ptr.cast(), index)),
                (Kind::Track, Item::Artists) => wrap(sys::sp_track_artist(ptr.cast(), index)),
                (Kind::Search, Item::Tracks) => wrap(sys::sp_search_track(ptr.cast(), index)),
                (Kind::Search, Item::Albums) => wrap(sys::sp_search_album(ptr.cast(), index)),
                (Kind::Search, Item::Artists) => wrap(sys::sp_search_artist(ptr.cast(), index)),
                (Kind::AlbumBrowse, Item::Tracks) => {
                    wrap(sys::sp_albumbrowse_track(ptr.cast(), index))
                }
                (Kind::ArtistBrowse, Item::Tracks) => {
                    wrap(sys::sp_artistbrowse_track(ptr.cast(), index))
                }
                (Kind::ArtistBrowse, Item::Albums) => {
                    wrap(sys::sp_artistbrowse_album(ptr.cast(), index))
                }
                (Kind::ArtistBrowse, Item::SimilarArtists) => {
                    wrap(sys::sp_artistbrowse_similar_artist(ptr.cast(), index))
                }
                (Kind::ToplistBrowse, Item::Tracks) => {
                    wrap(sys::sp_toplistbrowse_track(ptr.cast(), index))
                }
                (Kind::ToplistBrowse, Item::Albums) => {
                    wrap(sys::sp_toplistbrowse_album(ptr.cast(), index))
                }
                (Kind::ToplistBrowse, Item::Artists) => {
                    wrap(sys::sp_toplistbrowse_artist(ptr.cast(), index))
                }
                (Kind::Playlist, Item::Tracks) => wrap(sys::sp_playlist_track(ptr.cast(), index)),
                (Kind::PlaylistContainer, Item::Playlists) => {
                    wrap(sys::sp_playlistcontainer_playlist(ptr.cast(), index))
                }
                _ => None,
            }
        }
    }

    fn related(&self, kind: Kind, ptr: NativePtr, relation: Relation) -> Option<NativePtr> {
        unsafe {
            match (kind, relation) {
                (Kind::Session, Relation::User) => wrap(sys::sp_session_user(ptr.cast())),
                (Kind::Session, Relation::Container) => {
                    wrap(sys::sp_session_playlistcontainer(ptr.cast()))
                }
                (Kind::Track, Relation::Album) => wrap(sys::sp_track_album(ptr.cast())),
                (Kind::Album, Relation::Artist) => wrap(sys::sp_album_artist(ptr.cast())),
                (Kind::AlbumBrowse, Relation::Album) => wrap(sys::sp_albumbrowse_album(ptr.cast())),
                (Kind::AlbumBrowse, Relation::Artist) => {
                    wrap(sys::sp_albumbrowse_artist(ptr.cast()))
                }
                (Kind::ArtistBrowse, Relation::Artist) => {
                    wrap(sys::sp_artistbrowse_artist(ptr.cast()))
                }
                (Kind::Link, Relation::Track) => wrap(sys::sp_link_as_track(ptr.cast())),
                (Kind::Link, Relation::Album) => wrap(sys::sp_link_as_album(ptr.cast())),
                (Kind::Link, Relation::Artist) => wrap(sys::sp_link_as_artist(ptr.cast())),
                (Kind::Link, Relation::User) => wrap(sys::sp_link_as_user(ptr.cast())),
                (Kind::Playlist, Relation::User) => wrap(sys::sp_playlist_owner(ptr.cast())),
                (Kind::PlaylistContainer, Relation::User) => {
                    wrap(sys::sp_playlistcontainer_owner(ptr.cast()))
                }
                _ => {
                    unsupported("related", kind);
                    None
                }
            }
        }
    }

    fn session_create(&self, config: &NativeConfig, userdata: Userdata) -> Result<NativePtr, ErrorCode> {
        let native = sys::sp_session_config {
            api_version: config.api_version,
            cache_location: config.cache_location.as_ptr(),
            settings_location: config.settings_location.as_ptr(),
            application_key: config.application_key.as_ptr().cast(),
            application_key_size: config.application_key.len(),
            user_agent: config.user_agent.as_ptr(),
            callbacks: &CALLBACKS,
            userdata: userdata.as_ptr(),
            compress_playlists: config.compress_playlists,
            dont_save_metadata_for_playlists: config.dont_save_metadata_for_playlists,
            initially_unload_playlists: config.initially_unload_playlists,
            device_id: optional(&config.device_id),
            tracefile: optional(&config.tracefile),
        };

        let mut session = ptr::null_mut();
        let code = ErrorCode::from_raw(unsafe { sys::sp_session_create(&native, &mut session) });
        if !code.is_ok() {
            return Err(code);
        }
        wrap(session).ok_or(ErrorCode::ApiInitializationFailed)
    }

    fn session_login(&self, session: NativePtr, username: &CStr, password: &CStr, remember_me: bool) {
        unsafe {
            sys::sp_session_login(session.cast(), username.as_ptr(), password.as_ptr(), remember_me)
        }
    }

    fn session_relogin(&self, session: NativePtr) -> ErrorCode {
        ErrorCode::from_raw(unsafe { sys::sp_session_relogin(session.cast()) })
    }

    fn session_remembered_user(&self, session: NativePtr) -> Option<String> {
        read_into_buffer(|buffer, size| unsafe {
            sys::sp_session_remembered_user(session.cast(), buffer, size)
        })
    }

    fn session_forget_me(&self, session: NativePtr) {
        unsafe { sys::sp_session_forget_me(session.cast()) }
    }

    fn session_logout(&self, session: NativePtr) {
        unsafe { sys::sp_session_logout(session.cast()) }
    }

    fn session_connection_state(&self, session: NativePtr) -> ConnectionState {
        ConnectionState::from_raw(unsafe { sys::sp_session_connectionstate(session.cast()) })
    }

    fn session_set_cache_size(&self, session: NativePtr, megabytes: usize) {
        unsafe { sys::sp_session_set_cache_size(session.cast(), megabytes) }
    }

    fn session_process_events(&self, session: NativePtr) -> i32 {
        let mut next_timeout: c_int = 0;
        unsafe { sys::sp_session_process_events(session.cast(), &mut next_timeout) };
        next_timeout
    }

    fn session_inbox_create(&self, session: NativePtr) -> Option<NativePtr> {
        wrap(unsafe { sys::sp_session_inbox_create(session.cast()) })
    }

    fn session_starred_create(&self, session: NativePtr) -> Option<NativePtr> {
        wrap(unsafe { sys::sp_session_starred_create(session.cast()) })
    }

    fn session_starred_for_user_create(&self, session: NativePtr, username: &CStr) -> Option<NativePtr> {
        wrap(unsafe { sys::sp_session_starred_for_user_create(session.cast(), username.as_ptr()) })
    }

    fn session_published_container_for_user_create(
        &self,
        session: NativePtr,
        username: Option<&CStr>,
    ) -> Option<NativePtr> {
        let username = username.map_or(ptr::null(), CStr::as_ptr);
        wrap(unsafe { sys::sp_session_publishedcontainer_for_user_create(session.cast(), username) })
    }

    fn session_preferred_bitrate(&self, session: NativePtr, bitrate: Bitrate) {
        unsafe { sys::sp_session_preferred_bitrate(session.cast(), bitrate as c_int) }
    }

    fn session_preferred_offline_bitrate(&self, session: NativePtr, bitrate: Bitrate, allow_resync: bool) {
        unsafe {
            sys::sp_session_preferred_offline_bitrate(session.cast(), bitrate as c_int, allow_resync)
        }
    }

    fn session_set_connection_type(&self, session: NativePtr, connection_type: ConnectionType) {
        unsafe { sys::sp_session_set_connection_type(session.cast(), connection_type as c_int) }
    }

    fn session_set_connection_rules(&self, session: NativePtr, rules: u32) {
        unsafe { sys::sp_session_set_connection_rules(session.cast(), rules) }
    }

    fn session_user_country(&self, session: NativePtr) -> i32 {
        unsafe { sys::sp_session_user_country(session.cast()) }
    }

    fn player_load(&self, session: NativePtr, track: NativePtr) -> ErrorCode {
        ErrorCode::from_raw(unsafe { sys::sp_session_player_load(session.cast(), track.cast()) })
    }

    fn player_seek(&self, session: NativePtr, offset_ms: i32) {
        unsafe { sys::sp_session_player_seek(session.cast(), offset_ms) }
    }

    fn player_play(&self, session: NativePtr, play: bool) {
        unsafe { sys::sp_session_player_play(session.cast(), play) }
    }

    fn player_unload(&self, session: NativePtr) {
        unsafe { sys::sp_session_player_unload(session.cast()) }
    }

    fn player_prefetch(&self, session: NativePtr, track: NativePtr) -> ErrorCode {
        ErrorCode::from_raw(unsafe { sys::sp_session_player_prefetch(session.cast(), track.cast()) })
    }

    fn offline_tracks_to_sync(&self, session: NativePtr) -> i32 {
        unsafe { sys::sp_offline_tracks_to_sync(session.cast()) }
    }

    fn offline_num_playlists(&self, session: NativePtr) -> i32 {
        unsafe { sys::sp_offline_num_playlists(session.cast()) }
    }

    fn offline_sync_status(&self, session: NativePtr) -> Option<OfflineSyncStatus> {
        let mut status = sys::sp_offline_sync_status::default();
        if !unsafe { sys::sp_offline_sync_get_status(session.cast(), &mut status) } {
            return None;
        }
        Some(OfflineSyncStatus {
            queued_tracks: status.queued_tracks,
            queued_bytes: status.queued_bytes,
            done_tracks: status.done_tracks,
            done_bytes: status.done_bytes,
            copied_tracks: status.copied_tracks,
            copied_bytes: status.copied_bytes,
            willnotcopy_tracks: status.willnotcopy_tracks,
            error_tracks: status.error_tracks,
            syncing: status.syncing,
        })
    }

    fn offline_time_left(&self, session: NativePtr) -> i32 {
        unsafe { sys::sp_offline_time_left(session.cast()) }
    }

    fn track_flag(&self, session: NativePtr, track: NativePtr, flag: TrackFlag) -> bool {
        let (session, track) = (session.cast(), track.cast());
        unsafe {
            match flag {
                TrackFlag::Available => sys::sp_track_is_available(session, track),
                TrackFlag::Local => sys::sp_track_is_local(session, track),
                TrackFlag::Autolinked => sys::sp_track_is_autolinked(session, track),
                TrackFlag::Starred => sys::sp_track_is_starred(session, track),
            }
        }
    }

    fn track_set_starred(&self, session: NativePtr, tracks: &[NativePtr], star: bool) {
        let tracks: Vec<*mut sys::sp_track> = tracks.iter().map(|track| track.cast()).collect();
        let Ok(len) = c_int::try_from(tracks.len()) else {
            warn!(len = tracks.len(), "too many tracks to star at once");
            return;
        };
        unsafe { sys::sp_track_set_starred(session.cast(), tracks.as_ptr(), len, star) }
    }

    fn track_duration(&self, track: NativePtr) -> i32 {
        unsafe { sys::sp_track_duration(track.cast()) }
    }

    fn track_popularity(&self, track: NativePtr) -> i32 {
        unsafe { sys::sp_track_popularity(track.cast()) }
    }

    fn track_disc(&self, track: NativePtr) -> i32 {
        unsafe { sys::sp_track_disc(track.cast()) }
    }

    fn track_index(&self, track: NativePtr) -> i32 {
        unsafe { sys::sp_track_index(track.cast()) }
    }

    fn localtrack_create(&self, artist: &CStr, title: &CStr, album: &CStr, length_ms: i32) -> Option<NativePtr> {
        wrap(unsafe {
            sys::sp_localtrack_create(artist.as_ptr(), title.as_ptr(), album.as_ptr(), length_ms)
        })
    }

    fn album_is_available(&self, album: NativePtr) -> bool {
        unsafe { sys::sp_album_is_available(album.cast()) }
    }

    fn album_year(&self, album: NativePtr) -> i32 {
        unsafe { sys::sp_album_year(album.cast()) }
    }

    fn album_type(&self, album: NativePtr) -> AlbumType {
        AlbumType::from_raw(unsafe { sys::sp_album_type(album.cast()) })
    }

    fn album_cover(&self, album: NativePtr) -> Option<ImageId> {
        unsafe { image_id_at(sys::sp_album_cover(album.cast())) }
    }

    fn user_canonical_name(&self, user: NativePtr) -> Option<String> {
        unsafe { copy_cstr(sys::sp_user_canonical_name(user.cast())) }
    }

    fn user_display_name(&self, user: NativePtr) -> Option<String> {
        unsafe { copy_cstr(sys::sp_user_display_name(user.cast())) }
    }

    fn link_create_from_string(&self, link: &CStr) -> Option<NativePtr> {
        wrap(unsafe { sys::sp_link_create_from_string(link.as_ptr()) })
    }

    fn link_create_from(&self, kind: Kind, ptr: NativePtr, offset_ms: i32) -> Option<NativePtr> {
        unsafe {
            match kind {
                Kind::Track => wrap(sys::sp_link_create_from_track(ptr.cast(), offset_ms)),
                Kind::Album => wrap(sys::sp_link_create_from_album(ptr.cast())),
                Kind::Artist => wrap(sys::sp_link_create_from_artist(ptr.cast())),
                _ => {
                    unsupported("link_create_from", kind);
                    None
                }
            }
        }
    }

    fn link_type(&self, link: NativePtr) -> LinkType {
        LinkType::from_raw(unsafe { sys::sp_link_type(link.cast()) })
    }

    fn link_as_string(&self, link: NativePtr) -> Option<String> {
        read_into_buffer(|buffer, size| unsafe {
            sys::sp_link_as_string(link.cast(), buffer, c_int::try_from(size).unwrap_or(c_int::MAX))
        })
    }

    fn image_create(&self, session: NativePtr, id: &ImageId) -> Option<NativePtr> {
        wrap(unsafe { sys::sp_image_create(session.cast(), id.as_bytes().as_ptr()) })
    }

    fn image_format(&self, image: NativePtr) -> ImageFormat {
        ImageFormat::from_raw(unsafe { sys::sp_image_format(image.cast()) })
    }

    fn image_data(&self, image: NativePtr) -> Vec<u8> {
        let mut size = 0;
        let data = unsafe { sys::sp_image_data(image.cast(), &mut size) };
        if data.is_null() || size == 0 {
            return Vec::new();
        }
        unsafe { slice::from_raw_parts(data.cast::<u8>(), size) }.to_vec()
    }

    fn image_id(&self, image: NativePtr) -> Option<ImageId> {
        unsafe { image_id_at(sys::sp_image_image_id(image.cast())) }
    }

    fn search_create(&self, session: NativePtr, params: &SearchParams, userdata: Userdata) -> Option<NativePtr> {
        wrap(unsafe {
            sys::sp_search_create(
                session.cast(),
                params.query.as_ptr(),
                params.track_offset,
                params.track_count,
                params.album_offset,
                params.album_count,
                params.artist_offset,
                params.artist_count,
                shims::search_complete,
                userdata.as_ptr(),
            )
        })
    }

    fn radio_search_create(
        &self,
        session: NativePtr,
        from_year: u32,
        to_year: u32,
        genres: u32,
        userdata: Userdata,
    ) -> Option<NativePtr> {
        wrap(unsafe {
            sys::sp_radio_search_create(
                session.cast(),
                from_year,
                to_year,
                genres,
                shims::search_complete,
                userdata.as_ptr(),
            )
        })
    }

    fn search_query(&self, search: NativePtr) -> String {
        unsafe { copy_cstr(sys::sp_search_query(search.cast())) }.unwrap_or_default()
    }

    fn search_did_you_mean(&self, search: NativePtr) -> String {
        unsafe { copy_cstr(sys::sp_search_did_you_mean(search.cast())) }.unwrap_or_default()
    }

    fn search_total(&self, search: NativePtr, item: Item) -> i32 {
        unsafe {
            match item {
                Item::Tracks => sys::sp_search_total_tracks(search.cast()),
                Item::Albums => sys::sp_search_total_albums(search.cast()),
                Item::Artists => sys::sp_search_total_artists(search.cast()),
                _ => {
                    unsupported("search_total", Kind::Search);
                    0
                }
            }
        }
    }

    fn albumbrowse_create(&self, session: NativePtr, album: NativePtr, userdata: Userdata) -> Option<NativePtr> {
        wrap(unsafe {
            sys::sp_albumbrowse_create(
                session.cast(),
                album.cast(),
                shims::albumbrowse_complete,
                userdata.as_ptr(),
            )
        })
    }

    fn albumbrowse_review(&self, browse: NativePtr) -> String {
        unsafe { copy_cstr(sys::sp_albumbrowse_review(browse.cast())) }.unwrap_or_default()
    }

    fn artistbrowse_create(
        &self,
        session: NativePtr,
        artist: NativePtr,
        browse_type: ArtistBrowseType,
        userdata: Userdata,
    ) -> Option<NativePtr> {
        wrap(unsafe {
            sys::sp_artistbrowse_create(
                session.cast(),
                artist.cast(),
                browse_type as c_int,
                shims::artistbrowse_complete,
                userdata.as_ptr(),
            )
        })
    }

    fn artistbrowse_biography(&self, browse: NativePtr) -> String {
        unsafe { copy_cstr(sys::sp_artistbrowse_biography(browse.cast())) }.unwrap_or_default()
    }

    fn toplistbrowse_create(
        &self,
        session: NativePtr,
        toplist_type: ToplistType,
        region: i32,
        username: Option<&CStr>,
        userdata: Userdata,
    ) -> Option<NativePtr> {
        wrap(unsafe {
            sys::sp_toplistbrowse_create(
                session.cast(),
                toplist_type as c_int,
                region,
                username.map_or(ptr::null(), CStr::as_ptr),
                shims::toplistbrowse_complete,
                userdata.as_ptr(),
            )
        })
    }
}

static CALLBACKS: sys::sp_session_callbacks = sys::sp_session_callbacks {
    logged_in: Some(shims::logged_in),
    logged_out: Some(shims::logged_out),
    metadata_updated: Some(shims::metadata_updated),
    connection_error: Some(shims::connection_error),
    message_to_user: Some(shims::message_to_user),
    notify_main_thread: Some(shims::notify_main_thread),
    music_delivery: Some(shims::music_delivery),
    play_token_lost: Some(shims::play_token_lost),
    log_message: Some(shims::log_message),
    end_of_track: Some(shims::end_of_track),
    streaming_error: Some(shims::streaming_error),
    userinfo_updated: Some(shims::userinfo_updated),
    start_playback: Some(shims::start_playback),
    stop_playback: Some(shims::stop_playback),
    get_audio_buffer_stats: Some(shims::get_audio_buffer_stats),
    offline_status_updated: Some(shims::offline_status_updated),
};

/// C-ABI entry points registered with libspotify.
mod shims {
    use super::*;

    unsafe fn userdata_of(session: *mut sys::sp_session) -> Userdata {
        Userdata::new(unsafe { sys::sp_session_userdata(session) })
    }

    macro_rules! session_shims {
        ($($event:ident),* $(,)?) => {
            $(
                pub(super) unsafe extern "C" fn $event(session: *mut sys::sp_session) {
                    unsafe { trampoline::$event(userdata_of(session)) }
                }
            )*
        };
    }

    macro_rules! error_shims {
        ($($event:ident),* $(,)?) => {
            $(
                pub(super) unsafe extern "C" fn $event(session: *mut sys::sp_session, error: sys::sp_error) {
                    unsafe { trampoline::$event(userdata_of(session), error) }
                }
            )*
        };
    }

    session_shims!(
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

    error_shims!(logged_in, connection_error, streaming_error);

    pub(super) unsafe extern "C" fn message_to_user(session: *mut sys::sp_session, message: *const c_char) {
        unsafe { trampoline::message_to_user(userdata_of(session), message) }
    }

    pub(super) unsafe extern "C" fn log_message(session: *mut sys::sp_session, message: *const c_char) {
        unsafe { trampoline::log_message(userdata_of(session), message) }
    }

    pub(super) unsafe extern "C" fn music_delivery(
        session: *mut sys::sp_session,
        format: *const sys::sp_audioformat,
        frames: *const c_void,
        num_frames: c_int,
    ) -> c_int {
        let Some(format) = (unsafe { format.as_ref() }) else {
            return 0;
        };
        let format = AudioFormat {
            sample_type: SampleType::from_raw(format.sample_type),
            sample_rate: format.sample_rate,
            channels: format.channels,
        };
        unsafe { trampoline::music_delivery(userdata_of(session), format, frames, num_frames) }
    }

    pub(super) unsafe extern "C" fn get_audio_buffer_stats(
        session: *mut sys::sp_session,
        stats: *mut sys::sp_audio_buffer_stats,
    ) {
        let reported = unsafe { trampoline::audio_buffer_stats(userdata_of(session)) };
        if let Some(stats) = unsafe { stats.as_mut() } {
            stats.samples = reported.samples;
            stats.stutter = reported.stutter;
        }
    }

    pub(super) unsafe extern "C" fn search_complete(_search: *mut sys::sp_search, userdata: *mut c_void) {
        unsafe { trampoline::request_complete::<Search>(Userdata::new(userdata)) }
    }

    pub(super) unsafe extern "C" fn albumbrowse_complete(
        _browse: *mut sys::sp_albumbrowse,
        userdata: *mut c_void,
    ) {
        unsafe { trampoline::request_complete::<AlbumBrowse>(Userdata::new(userdata)) }
    }

    pub(super) unsafe extern "C" fn artistbrowse_complete(
        _browse: *mut sys::sp_artistbrowse,
        userdata: *mut c_void,
    ) {
        unsafe { trampoline::request_complete::<ArtistBrowse>(Userdata::new(userdata)) }
    }

    pub(super) unsafe extern "C" fn toplistbrowse_complete(
        _browse: *mut sys::sp_toplistbrowse,
        userdata: *mut c_void,
    ) {
        unsafe { trampoline::request_complete::<ToplistBrowse>(Userdata::new(userdata)) }
    }
}
