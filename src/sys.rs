// Raw declarations for libspotify (API version 9).
#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_uint, c_void, size_t};

macro_rules! opaque {
    ($($name:ident),* $(,)?) => {
        $(
            #[repr(C)]
            pub struct $name {
                _private: [u8; 0],
            }
        )*
    };
}

opaque!(
    sp_session,
    sp_track,
    sp_album,
    sp_artist,
    sp_albumbrowse,
    sp_artistbrowse,
    sp_toplistbrowse,
    sp_search,
    sp_link,
    sp_image,
    sp_user,
    sp_playlist,
    sp_playlistcontainer,
);

pub type sp_error = c_int;
pub type sp_byte = u8;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct sp_audioformat {
    pub sample_type: c_int,
    pub sample_rate: c_int,
    pub channels: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct sp_audio_buffer_stats {
    pub samples: c_int,
    pub stutter: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct sp_offline_sync_status {
    pub queued_tracks: c_int,
    pub queued_bytes: u64,
    pub done_tracks: c_int,
    pub done_bytes: u64,
    pub copied_tracks: c_int,
    pub copied_bytes: u64,
    pub willnotcopy_tracks: c_int,
    pub error_tracks: c_int,
    pub syncing: bool,
}

#[repr(C)]
pub struct sp_session_callbacks {
    pub logged_in: Option<unsafe extern "C" fn(*mut sp_session, sp_error)>,
    pub logged_out: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub metadata_updated: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub connection_error: Option<unsafe extern "C" fn(*mut sp_session, sp_error)>,
    pub message_to_user: Option<unsafe extern "C" fn(*mut sp_session, *const c_char)>,
    pub notify_main_thread: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub music_delivery: Option<
        unsafe extern "C" fn(*mut sp_session, *const sp_audioformat, *const c_void, c_int) -> c_int,
    >,
    pub play_token_lost: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub log_message: Option<unsafe extern "C" fn(*mut sp_session, *const c_char)>,
    pub end_of_track: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub streaming_error: Option<unsafe extern "C" fn(*mut sp_session, sp_error)>,
    pub userinfo_updated: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub start_playback: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub stop_playback: Option<unsafe extern "C" fn(*mut sp_session)>,
    pub get_audio_buffer_stats:
        Option<unsafe extern "C" fn(*mut sp_session, *mut sp_audio_buffer_stats)>,
    pub offline_status_updated: Option<unsafe extern "C" fn(*mut sp_session)>,
}

#[repr(C)]
pub struct sp_session_config {
    pub api_version: c_int,
    pub cache_location: *const c_char,
    pub settings_location: *const c_char,
    pub application_key: *const c_void,
    pub application_key_size: size_t,
    pub user_agent: *const c_char,
    pub callbacks: *const sp_session_callbacks,
    pub userdata: *mut c_void,
    pub compress_playlists: bool,
    pub dont_save_metadata_for_playlists: bool,
    pub initially_unload_playlists: bool,
    pub device_id: *const c_char,
    pub tracefile: *const c_char,
}

pub type search_complete_cb = unsafe extern "C" fn(*mut sp_search, *mut c_void);
pub type albumbrowse_complete_cb = unsafe extern "C" fn(*mut sp_albumbrowse, *mut c_void);
pub type artistbrowse_complete_cb = unsafe extern "C" fn(*mut sp_artistbrowse, *mut c_void);
pub type toplistbrowse_complete_cb = unsafe extern "C" fn(*mut sp_toplistbrowse, *mut c_void);

unsafe extern "C" {
    pub fn sp_error_message(error: sp_error) -> *const c_char;

    // Session
    pub fn sp_session_create(config: *const sp_session_config, sess: *mut *mut sp_session) -> sp_error;
    pub fn sp_session_release(session: *mut sp_session);
    pub fn sp_session_login(
        session: *mut sp_session,
        username: *const c_char,
        password: *const c_char,
        remember_me: bool,
    );
    pub fn sp_session_relogin(session: *mut sp_session) -> sp_error;
    pub fn sp_session_remembered_user(session: *mut sp_session, buffer: *mut c_char, buffer_size: size_t)
    -> c_int;
    pub fn sp_session_forget_me(session: *mut sp_session);
    pub fn sp_session_user(session: *mut sp_session) -> *mut sp_user;
    pub fn sp_session_logout(session: *mut sp_session);
    pub fn sp_session_connectionstate(session: *mut sp_session) -> c_int;
    pub fn sp_session_userdata(session: *mut sp_session) -> *mut c_void;
    pub fn sp_session_set_cache_size(session: *mut sp_session, size: size_t);
    pub fn sp_session_process_events(session: *mut sp_session, next_timeout: *mut c_int);
    pub fn sp_session_player_load(session: *mut sp_session, track: *mut sp_track) -> sp_error;
    pub fn sp_session_player_seek(session: *mut sp_session, offset: c_int);
    pub fn sp_session_player_play(session: *mut sp_session, play: bool);
    pub fn sp_session_player_unload(session: *mut sp_session);
    pub fn sp_session_player_prefetch(session: *mut sp_session, track: *mut sp_track) -> sp_error;
    pub fn sp_session_playlistcontainer(session: *mut sp_session) -> *mut sp_playlistcontainer;
    pub fn sp_session_inbox_create(session: *mut sp_session) -> *mut sp_playlist;
    pub fn sp_session_starred_create(session: *mut sp_session) -> *mut sp_playlist;
    pub fn sp_session_starred_for_user_create(session: *mut sp_session, canonical_username: *const c_char)
    -> *mut sp_playlist;
    pub fn sp_session_publishedcontainer_for_user_create(
        session: *mut sp_session,
        canonical_username: *const c_char,
    ) -> *mut sp_playlistcontainer;
    pub fn sp_session_preferred_bitrate(session: *mut sp_session, bitrate: c_int);
    pub fn sp_session_preferred_offline_bitrate(session: *mut sp_session, bitrate: c_int, allow_resync: bool);
    pub fn sp_session_num_friends(session: *mut sp_session) -> c_int;
    pub fn sp_session_friend(session: *mut sp_session, index: c_int) -> *mut sp_user;
    pub fn sp_session_set_connection_type(session: *mut sp_session, connection_type: c_int);
    pub fn sp_session_set_connection_rules(session: *mut sp_session, rules: c_uint);
    pub fn sp_session_user_country(session: *mut sp_session) -> c_int;

    // Offline sync
    pub fn sp_offline_tracks_to_sync(session: *mut sp_session) -> c_int;
    pub fn sp_offline_num_playlists(session: *mut sp_session) -> c_int;
    pub fn sp_offline_sync_get_status(session: *mut sp_session, status: *mut sp_offline_sync_status) -> bool;
    pub fn sp_offline_time_left(session: *mut sp_session) -> c_int;

    // Track
    pub fn sp_track_is_loaded(track: *mut sp_track) -> bool;
    pub fn sp_track_error(track: *mut sp_track) -> sp_error;
    pub fn sp_track_is_available(session: *mut sp_session, track: *mut sp_track) -> bool;
    pub fn sp_track_is_local(session: *mut sp_session, track: *mut sp_track) -> bool;
    pub fn sp_track_is_autolinked(session: *mut sp_session, track: *mut sp_track) -> bool;
    pub fn sp_track_is_starred(session: *mut sp_session, track: *mut sp_track) -> bool;
    pub fn sp_track_set_starred(
        session: *mut sp_session,
        tracks: *const *mut sp_track,
        num_tracks: c_int,
        star: bool,
    );
    pub fn sp_track_num_artists(track: *mut sp_track) -> c_int;
    pub fn sp_track_artist(track: *mut sp_track, index: c_int) -> *mut sp_artist;
    pub fn sp_track_album(track: *mut sp_track) -> *mut sp_album;
    pub fn sp_track_name(track: *mut sp_track) -> *const c_char;
    pub fn sp_track_duration(track: *mut sp_track) -> c_int;
    pub fn sp_track_popularity(track: *mut sp_track) -> c_int;
    pub fn sp_track_disc(track: *mut sp_track) -> c_int;
    pub fn sp_track_index(track: *mut sp_track) -> c_int;
    pub fn sp_localtrack_create(
        artist: *const c_char,
        title: *const c_char,
        album: *const c_char,
        length: c_int,
    ) -> *mut sp_track;
    pub fn sp_track_add_ref(track: *mut sp_track);
    pub fn sp_track_release(track: *mut sp_track);

    // Album
    pub fn sp_album_is_loaded(album: *mut sp_album) -> bool;
    pub fn sp_album_is_available(album: *mut sp_album) -> bool;
    pub fn sp_album_artist(album: *mut sp_album) -> *mut sp_artist;
    pub fn sp_album_cover(album: *mut sp_album) -> *const sp_byte;
    pub fn sp_album_name(album: *mut sp_album) -> *const c_char;
    pub fn sp_album_year(album: *mut sp_album) -> c_int;
    pub fn sp_album_type(album: *mut sp_album) -> c_int;
    pub fn sp_album_add_ref(album: *mut sp_album);
    pub fn sp_album_release(album: *mut sp_album);

    // Artist
    pub fn sp_artist_name(artist: *mut sp_artist) -> *const c_char;
    pub fn sp_artist_is_loaded(artist: *mut sp_artist) -> bool;
    pub fn sp_artist_add_ref(artist: *mut sp_artist);
    pub fn sp_artist_release(artist: *mut sp_artist);

    // Album browse
    pub fn sp_albumbrowse_create(
        session: *mut sp_session,
        album: *mut sp_album,
        callback: albumbrowse_complete_cb,
        userdata: *mut c_void,
    ) -> *mut sp_albumbrowse;
    pub fn sp_albumbrowse_is_loaded(alb: *mut sp_albumbrowse) -> bool;
    pub fn sp_albumbrowse_error(alb: *mut sp_albumbrowse) -> sp_error;
    pub fn sp_albumbrowse_album(alb: *mut sp_albumbrowse) -> *mut sp_album;
    pub fn sp_albumbrowse_artist(alb: *mut sp_albumbrowse) -> *mut sp_artist;
    pub fn sp_albumbrowse_num_tracks(alb: *mut sp_albumbrowse) -> c_int;
    pub fn sp_albumbrowse_track(alb: *mut sp_albumbrowse, index: c_int) -> *mut sp_track;
    pub fn sp_albumbrowse_review(alb: *mut sp_albumbrowse) -> *const c_char;
    pub fn sp_albumbrowse_add_ref(alb: *mut sp_albumbrowse);
    pub fn sp_albumbrowse_release(alb: *mut sp_albumbrowse);

    // Artist browse
    pub fn sp_artistbrowse_create(
        session: *mut sp_session,
        artist: *mut sp_artist,
        browse_type: c_int,
        callback: artistbrowse_complete_cb,
        userdata: *mut c_void,
    ) -> *mut sp_artistbrowse;
    pub fn sp_artistbrowse_is_loaded(arb: *mut sp_artistbrowse) -> bool;
    pub fn sp_artistbrowse_error(arb: *mut sp_artistbrowse) -> sp_error;
    pub fn sp_artistbrowse_artist(arb: *mut sp_artistbrowse) -> *mut sp_artist;
    pub fn sp_artistbrowse_num_tracks(arb: *mut sp_artistbrowse) -> c_int;
    pub fn sp_artistbrowse_track(arb: *mut sp_artistbrowse, index: c_int) -> *mut sp_track;
    pub fn sp_artistbrowse_num_albums(arb: *mut sp_artistbrowse) -> c_int;
    pub fn sp_artistbrowse_album(arb: *mut sp_artistbrowse, index: c_int) -> *mut sp_album;
    pub fn sp_artistbrowse_num_similar_artists(arb: *mut sp_artistbrowse) -> c_int;
    pub fn sp_artistbrowse_similar_artist(arb: *mut sp_artistbrowse, index: c_int) -> *mut sp_artist;
    pub fn sp_artistbrowse_biography(arb: *mut sp_artistbrowse) -> *const c_char;
    pub fn sp_artistbrowse_add_ref(arb: *mut sp_artistbrowse);
    pub fn sp_artistbrowse_release(arb: *mut sp_artistbrowse);

    // Toplist browse
    pub fn sp_toplistbrowse_create(
        session: *mut sp_session,
        toplist_type: c_int,
        region: c_int,
        username: *const c_char,
        callback: toplistbrowse_complete_cb,
        userdata: *mut c_void,
    ) -> *mut sp_toplistbrowse;
    pub fn sp_toplistbrowse_is_loaded(tlb: *mut sp_toplistbrowse) -> bool;
    pub fn sp_toplistbrowse_error(tlb: *mut sp_toplistbrowse) -> sp_error;
    pub fn sp_toplistbrowse_num_artists(tlb: *mut sp_toplistbrowse) -> c_int;
    pub fn sp_toplistbrowse_artist(tlb: *mut sp_toplistbrowse, index: c_int) -> *mut sp_artist;
    pub fn sp_toplistbrowse_num_albums(tlb: *mut sp_toplistbrowse) -> c_int;
    pub fn sp_toplistbrowse_album(tlb: *mut sp_toplistbrowse, index: c_int) -> *mut sp_album;
    pub fn sp_toplistbrowse_num_tracks(tlb: *mut sp_toplistbrowse) -> c_int;
    pub fn sp_toplistbrowse_track(tlb: *mut sp_toplistbrowse, index: c_int) -> *mut sp_track;
    pub fn sp_toplistbrowse_add_ref(tlb: *mut sp_toplistbrowse);
    pub fn sp_toplistbrowse_release(tlb: *mut sp_toplistbrowse);

    // Search
    pub fn sp_search_create(
        session: *mut sp_session,
        query: *const c_char,
        track_offset: c_int,
        track_count: c_int,
        album_offset: c_int,
        album_count: c_int,
        artist_offset: c_int,
        artist_count: c_int,
        callback: search_complete_cb,
        userdata: *mut c_void,
    ) -> *mut sp_search;
    pub fn sp_radio_search_create(
        session: *mut sp_session,
        from_year: c_uint,
        to_year: c_uint,
        genres: c_uint,
        callback: search_complete_cb,
        userdata: *mut c_void,
    ) -> *mut sp_search;
    pub fn sp_search_is_loaded(search: *mut sp_search) -> bool;
    pub fn sp_search_error(search: *mut sp_search) -> sp_error;
    pub fn sp_search_num_tracks(search: *mut sp_search) -> c_int;
    pub fn sp_search_track(search: *mut sp_search, index: c_int) -> *mut sp_track;
    pub fn sp_search_num_albums(search: *mut sp_search) -> c_int;
    pub fn sp_search_album(search: *mut sp_search, index: c_int) -> *mut sp_album;
    pub fn sp_search_num_artists(search: *mut sp_search) -> c_int;
    pub fn sp_search_artist(search: *mut sp_search, index: c_int) -> *mut sp_artist;
    pub fn sp_search_query(search: *mut sp_search) -> *const c_char;
    pub fn sp_search_did_you_mean(search: *mut sp_search) -> *const c_char;
    pub fn sp_search_total_tracks(search: *mut sp_search) -> c_int;
    pub fn sp_search_total_albums(search: *mut sp_search) -> c_int;
    pub fn sp_search_total_artists(search: *mut sp_search) -> c_int;
    pub fn sp_search_add_ref(search: *mut sp_search);
    pub fn sp_search_release(search: *mut sp_search);

    // Link
    pub fn sp_link_create_from_string(link: *const c_char) -> *mut sp_link;
    pub fn sp_link_create_from_track(track: *mut sp_track, offset: c_int) -> *mut sp_link;
    pub fn sp_link_create_from_album(album: *mut sp_album) -> *mut sp_link;
    pub fn sp_link_create_from_artist(artist: *mut sp_artist) -> *mut sp_link;
    pub fn sp_link_as_string(link: *mut sp_link, buffer: *mut c_char, buffer_size: c_int) -> c_int;
    pub fn sp_link_type(link: *mut sp_link) -> c_int;
    pub fn sp_link_as_track(link: *mut sp_link) -> *mut sp_track;
    pub fn sp_link_as_album(link: *mut sp_link) -> *mut sp_album;
    pub fn sp_link_as_artist(link: *mut sp_link) -> *mut sp_artist;
    pub fn sp_link_as_user(link: *mut sp_link) -> *mut sp_user;
    pub fn sp_link_add_ref(link: *mut sp_link);
    pub fn sp_link_release(link: *mut sp_link);

    // Image
    pub fn sp_image_create(session: *mut sp_session, image_id: *const sp_byte) -> *mut sp_image;
    pub fn sp_image_is_loaded(image: *mut sp_image) -> bool;
    pub fn sp_image_error(image: *mut sp_image) -> sp_error;
    pub fn sp_image_format(image: *mut sp_image) -> c_int;
    pub fn sp_image_data(image: *mut sp_image, data_size: *mut size_t) -> *const c_void;
    pub fn sp_image_image_id(image: *mut sp_image) -> *const sp_byte;
    pub fn sp_image_add_ref(image: *mut sp_image);
    pub fn sp_image_release(image: *mut sp_image);

    // User
    pub fn sp_user_canonical_name(user: *mut sp_user) -> *const c_char;
    pub fn sp_user_display_name(user: *mut sp_user) -> *const c_char;
    pub fn sp_user_is_loaded(user: *mut sp_user) -> bool;
    pub fn sp_user_add_ref(user: *mut sp_user);
    pub fn sp_user_release(user: *mut sp_user);

    // Playlist
    pub fn sp_playlist_is_loaded(playlist: *mut sp_playlist) -> bool;
    pub fn sp_playlist_name(playlist: *mut sp_playlist) -> *const c_char;
    pub fn sp_playlist_num_tracks(playlist: *mut sp_playlist) -> c_int;
    pub fn sp_playlist_track(playlist: *mut sp_playlist, index: c_int) -> *mut sp_track;
    pub fn sp_playlist_owner(playlist: *mut sp_playlist) -> *mut sp_user;
    pub fn sp_playlist_add_ref(playlist: *mut sp_playlist);
    pub fn sp_playlist_release(playlist: *mut sp_playlist);

    // Playlist container
    pub fn sp_playlistcontainer_is_loaded(pc: *mut sp_playlistcontainer) -> bool;
    pub fn sp_playlistcontainer_num_playlists(pc: *mut sp_playlistcontainer) -> c_int;
    pub fn sp_playlistcontainer_playlist(pc: *mut sp_playlistcontainer, index: c_int) -> *mut sp_playlist;
    pub fn sp_playlistcontainer_owner(pc: *mut sp_playlistcontainer) -> *mut sp_user;
    pub fn sp_playlistcontainer_add_ref(pc: *mut sp_playlistcontainer);
    pub fn sp_playlistcontainer_release(pc: *mut sp_playlistcontainer);
}
