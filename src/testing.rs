//! In-memory stand-in for libspotify used by the test-suite.
//!
//! Objects live in a map keyed by fake address and carry a reference count.
//! Any access to a freed object, a double release or a kind mismatch panics,
//! so a test that passes has not touched freed native memory. Callbacks are
//! fired through the real trampolines.

use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::path::Path;
use std::ptr;

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::browse::{AlbumBrowse, ArtistBrowse, ToplistBrowse};
use crate::config::{API_VERSION, SessionConfig};
use crate::error::ErrorCode;
use crate::handle::Kind;
use crate::native::{Item, Library, NativeConfig, NativePtr, Relation, SearchParams, TrackFlag, Userdata};
use crate::search::Search;
use crate::trampoline;
use crate::types::{
    AlbumType, ArtistBrowseType, Bitrate, ConnectionState, ConnectionType, ImageFormat, ImageId,
    LinkType, OfflineSyncStatus, ToplistType, pack_country,
};

/// Length of a well-formed application key.
pub(crate) const APP_KEY_LEN: usize = 321;

/// Install a test subscriber once; `RUST_LOG` selects the level.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A valid configuration whose locations live in a fresh temporary
/// directory. Keep the directory alive for the duration of the test.
pub(crate) fn test_config() -> (SessionConfig, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::new(vec![1; APP_KEY_LEN])
        .with_locations(dir.path().join("cache"), dir.path().join("settings"))
        .with_user_agent("spotify-ffi-tests");
    (config, dir)
}

fn native(addr: usize) -> NativePtr {
    NativePtr::new(ptr::without_provenance_mut(addr)).unwrap()
}

enum Event {
    LoggedIn(ErrorCode),
    LoggedOut,
}

struct SessionState {
    connection: ConnectionState,
    remembered: Option<String>,
    events: Vec<Event>,
}

struct Object {
    kind: Kind,
    refcount: usize,
    add_refs: usize,
    releases: usize,
    loaded: bool,
    name: Option<String>,
    display_name: Option<String>,
    text: String,
    duration: i32,
    disc: i32,
    index: i32,
    local: bool,
    starred: bool,
    link_type: LinkType,
    image_id: Option<ImageId>,
    userdata: Option<Userdata>,
    children: HashMap<Item, Vec<usize>>,
    related: HashMap<Relation, usize>,
    session: Option<SessionState>,
}

impl Object {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            refcount: 1,
            add_refs: 0,
            releases: 0,
            loaded: false,
            name: None,
            display_name: None,
            text: String::new(),
            duration: 0,
            disc: 0,
            index: 0,
            local: false,
            starred: false,
            link_type: LinkType::Invalid,
            image_id: None,
            userdata: None,
            children: HashMap::new(),
            related: HashMap::new(),
            session: None,
        }
    }
}

type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct State {
    next_addr: usize,
    objects: HashMap<usize, Object>,
    complete_during_create: bool,
    refuse_requests: bool,
    fire_on_release: bool,
    last_radio_genres: Option<u32>,
    last_toplist: Option<(i32, Option<String>)>,
    player_log: Vec<String>,
    settings_log: Vec<String>,
    unplayable: HashSet<usize>,
    process_hook: Option<Hook>,
    session_releases_in_callback: usize,
}

impl State {
    fn alloc(&mut self, kind: Kind) -> usize {
        self.next_addr += 0x10;
        let addr = 0x1000 + self.next_addr;
        self.objects.insert(addr, Object::new(kind));
        addr
    }

    fn named(&mut self, kind: Kind, name: impl Into<String>) -> usize {
        let addr = self.alloc(kind);
        let object = self.live(addr);
        object.loaded = true;
        object.name = Some(name.into());
        addr
    }

    fn live(&mut self, addr: usize) -> &mut Object {
        match self.objects.get_mut(&addr) {
            Some(object) if object.refcount > 0 => object,
            Some(object) => panic!("use after free of {} at {addr:#x}", object.kind),
            None => panic!("unknown native object {addr:#x}"),
        }
    }

    fn live_kind(&mut self, kind: Kind, addr: usize) -> &mut Object {
        let object = self.live(addr);
        assert_eq!(object.kind, kind, "kind mismatch at {addr:#x}");
        object
    }

    /// Move the creator's reference on `child` into `parent`.
    fn adopt_child(&mut self, parent: usize, item: Item, child: usize) {
        self.live(parent).children.entry(item).or_default().push(child);
    }

    fn adopt_related(&mut self, parent: usize, relation: Relation, other: usize) {
        self.live(parent).related.insert(relation, other);
    }

    fn share_related(&mut self, parent: usize, relation: Relation, other: usize) {
        self.live(other).refcount += 1;
        self.adopt_related(parent, relation, other);
    }

    fn named_children(&mut self, parent: usize, item: Item, kind: Kind, prefix: &str) {
        for i in 0..2 {
            let child = self.named(kind, format!("{prefix} {i}"));
            self.adopt_child(parent, item, child);
        }
    }

    /// Drop one reference; frees recursively. Returns the sessions whose
    /// release should fire a callback.
    fn decref(&mut self, addr: usize) -> Vec<Userdata> {
        let fire_on_release = self.fire_on_release;
        let mut fired = Vec::new();
        let mut pending = vec![addr];
        while let Some(addr) = pending.pop() {
            let object = self.live(addr);
            object.refcount -= 1;
            if object.refcount > 0 {
                continue;
            }
            pending.extend(object.children.drain().flat_map(|(_, children)| children));
            pending.extend(object.related.drain().map(|(_, other)| other));
            if object.kind == Kind::Session && fire_on_release {
                fired.extend(object.userdata);
            }
        }
        fired
    }

    fn session(&mut self, addr: usize) -> &mut SessionState {
        self.live_kind(Kind::Session, addr)
            .session
            .as_mut()
            .unwrap()
    }

    fn current_user(&mut self, session: usize) -> Option<usize> {
        self.live_kind(Kind::Session, session)
            .related
            .get(&Relation::User)
            .copied()
    }

    fn user(&mut self, name: &str) -> usize {
        let user = self.named(Kind::User, name);
        let mut display = name.to_string();
        if let Some(first) = display.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        self.live(user).display_name = Some(display);
        user
    }

    fn log_in(&mut self, session: usize, username: &str) {
        let user = self.user(username);
        let container = self.alloc(Kind::PlaylistContainer);
        self.live(container).loaded = true;
        self.share_related(container, Relation::User, user);
        let playlist = self.named(Kind::Playlist, format!("{username}'s playlist"));
        self.share_related(playlist, Relation::User, user);
        self.adopt_child(container, Item::Playlists, playlist);

        self.adopt_related(session, Relation::User, user);
        self.adopt_related(session, Relation::Container, container);
        let state = self.session(session);
        state.connection = ConnectionState::LoggedIn;
        state.events.push(Event::LoggedIn(ErrorCode::Ok));
    }

    fn playlist(&mut self, session: usize, name: &str, owner: Option<usize>) -> usize {
        let playlist = self.named(Kind::Playlist, name);
        if let Some(owner) = owner.or_else(|| self.current_user(session)) {
            self.share_related(playlist, Relation::User, owner);
        }
        playlist
    }

    fn request(&mut self, kind: Kind, userdata: Userdata) -> usize {
        let addr = self.alloc(kind);
        self.live(addr).userdata = Some(userdata);
        addr
    }
}

/// In-memory libspotify.
pub(crate) struct FakeLibrary {
    state: Mutex<State>,
}

impl FakeLibrary {
    pub(crate) fn new() -> Self {
        init_tracing();
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// A bare object with one reference owned by the caller.
    pub(crate) fn add_object(&self, kind: Kind) -> NativePtr {
        native(self.state.lock().alloc(kind))
    }

    fn object<R>(&self, ptr: NativePtr, f: impl FnOnce(&Object) -> R) -> R {
        let state = self.state.lock();
        let object = state
            .objects
            .get(&ptr.addr())
            .unwrap_or_else(|| panic!("unknown native object {ptr:?}"));
        f(object)
    }

    pub(crate) fn is_alive(&self, ptr: NativePtr) -> bool {
        self.object(ptr, |object| object.refcount > 0)
    }

    pub(crate) fn refcount(&self, ptr: NativePtr) -> usize {
        self.object(ptr, |object| object.refcount)
    }

    /// Number of `release` calls made on the object by the binding.
    pub(crate) fn releases(&self, ptr: NativePtr) -> usize {
        self.object(ptr, |object| object.releases)
    }

    pub(crate) fn add_refs(&self, ptr: NativePtr) -> usize {
        self.object(ptr, |object| object.add_refs)
    }

    pub(crate) fn live_objects(&self) -> usize {
        let state = self.state.lock();
        state.objects.values().filter(|o| o.refcount > 0).count()
    }

    pub(crate) fn live_objects_of(&self, kind: Kind) -> usize {
        let state = self.state.lock();
        state
            .objects
            .values()
            .filter(|o| o.kind == kind && o.refcount > 0)
            .count()
    }

    pub(crate) fn session_userdata(&self, ptr: NativePtr) -> Userdata {
        let mut state = self.state.lock();
        state
            .live_kind(Kind::Session, ptr.addr())
            .userdata
            .unwrap()
    }

    /// Mark an object as loaded.
    pub(crate) fn load(&self, ptr: NativePtr) {
        self.state.lock().live(ptr.addr()).loaded = true;
    }

    /// Signal completion of a search or browse, even if it was released.
    /// Only the first call fires.
    pub(crate) fn complete_request(&self, addr: usize) {
        let (kind, userdata) = {
            let mut state = self.state.lock();
            let object = state
                .objects
                .get_mut(&addr)
                .unwrap_or_else(|| panic!("unknown native object {addr:#x}"));
            if object.refcount > 0 {
                object.loaded = true;
            }
            (object.kind, object.userdata.take())
        };
        if let Some(userdata) = userdata {
            unsafe { fire_completion(kind, userdata) };
        }
    }

    /// Signal completion from inside the creating call.
    pub(crate) fn complete_during_create(&self, enabled: bool) {
        self.state.lock().complete_during_create = enabled;
    }

    /// Make request constructors return no object.
    pub(crate) fn refuse_requests(&self, enabled: bool) {
        self.state.lock().refuse_requests = enabled;
    }

    /// Fire `logged_out` from inside the final release of a session.
    pub(crate) fn fire_on_release(&self, enabled: bool) {
        self.state.lock().fire_on_release = enabled;
    }

    /// Run `hook` inside the next `process_events` call.
    pub(crate) fn on_process_events(&self, hook: impl FnOnce() + Send + 'static) {
        self.state.lock().process_hook = Some(Box::new(hook));
    }

    /// Native session releases made from inside application callbacks.
    pub(crate) fn session_releases_in_callback(&self) -> usize {
        self.state.lock().session_releases_in_callback
    }

    pub(crate) fn set_unplayable(&self, track: NativePtr) {
        self.state.lock().unplayable.insert(track.addr());
    }

    pub(crate) fn last_radio_genres(&self) -> Option<u32> {
        self.state.lock().last_radio_genres
    }

    pub(crate) fn last_toplist(&self) -> Option<(i32, Option<String>)> {
        self.state.lock().last_toplist.clone()
    }

    pub(crate) fn player_log(&self) -> Vec<String> {
        self.state.lock().player_log.clone()
    }

    pub(crate) fn settings_log(&self) -> Vec<String> {
        self.state.lock().settings_log.clone()
    }

    fn finish_request(&self, addr: usize) -> Option<NativePtr> {
        let complete_now = self.state.lock().complete_during_create;
        if complete_now {
            self.complete_request(addr);
        }
        Some(native(addr))
    }

    fn settings(&self, session: NativePtr, entry: String) {
        let mut state = self.state.lock();
        state.live_kind(Kind::Session, session.addr());
        state.settings_log.push(entry);
    }

    fn player(&self, session: NativePtr, track: Option<NativePtr>, entry: String) -> ErrorCode {
        let mut state = self.state.lock();
        state.live_kind(Kind::Session, session.addr());
        if let Some(track) = track {
            state.live_kind(Kind::Track, track.addr());
            if state.unplayable.contains(&track.addr()) {
                return ErrorCode::TrackNotPlayable;
            }
        }
        state.player_log.push(entry);
        ErrorCode::Ok
    }
}

unsafe fn fire_completion(kind: Kind, userdata: Userdata) {
    unsafe {
        match kind {
            Kind::Search => trampoline::request_complete::<Search>(userdata),
            Kind::AlbumBrowse => trampoline::request_complete::<AlbumBrowse>(userdata),
            Kind::ArtistBrowse => trampoline::request_complete::<ArtistBrowse>(userdata),
            Kind::ToplistBrowse => trampoline::request_complete::<ToplistBrowse>(userdata),
            other => panic!("{other} has no completion callback"),
        }
    }
}

fn text(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

impl Library for FakeLibrary {
    fn error_message(&self, code: ErrorCode) -> String {
        match code {
            ErrorCode::Ok => "No error".to_string(),
            ErrorCode::BadApplicationKey => "The application key is invalid".to_string(),
            ErrorCode::NoCredentials => "No credentials are stored".to_string(),
            other => format!("error {}", other.as_raw()),
        }
    }

    fn add_ref(&self, kind: Kind, ptr: NativePtr) {
        let mut state = self.state.lock();
        let object = state.live_kind(kind, ptr.addr());
        object.refcount += 1;
        object.add_refs += 1;
    }

    fn release(&self, kind: Kind, ptr: NativePtr) {
        let fired = {
            let mut state = self.state.lock();
            let object = state
                .objects
                .get_mut(&ptr.addr())
                .unwrap_or_else(|| panic!("release of unknown object {ptr:?}"));
            assert!(object.refcount > 0, "double release of {kind} {ptr:?}");
            assert_eq!(object.kind, kind);
            object.releases += 1;
            if kind == Kind::Session && trampoline::in_callback() {
                state.session_releases_in_callback += 1;
            }
            state.decref(ptr.addr())
        };
        for userdata in fired {
            unsafe { trampoline::logged_out(userdata) };
        }
    }

    fn is_loaded(&self, kind: Kind, ptr: NativePtr) -> bool {
        self.state.lock().live_kind(kind, ptr.addr()).loaded
    }

    fn load_error(&self, kind: Kind, ptr: NativePtr) -> ErrorCode {
        if self.is_loaded(kind, ptr) {
            ErrorCode::Ok
        } else {
            ErrorCode::IsLoading
        }
    }

    fn name(&self, kind: Kind, ptr: NativePtr) -> Option<String> {
        self.state.lock().live_kind(kind, ptr.addr()).name.clone()
    }

    fn count(&self, kind: Kind, ptr: NativePtr, item: Item) -> i32 {
        let mut state = self.state.lock();
        let object = state.live_kind(kind, ptr.addr());
        object.children.get(&item).map_or(0, |c| c.len() as i32)
    }

    fn item(&self, kind: Kind, ptr: NativePtr, item: Item, index: i32) -> Option<NativePtr> {
        let mut state = self.state.lock();
        let object = state.live_kind(kind, ptr.addr());
        let index = usize::try_from(index).ok()?;
        object
            .children
            .get(&item)
            .and_then(|children| children.get(index))
            .map(|&child| native(child))
    }

    fn related(&self, kind: Kind, ptr: NativePtr, relation: Relation) -> Option<NativePtr> {
        let mut state = self.state.lock();
        let object = state.live_kind(kind, ptr.addr());
        object.related.get(&relation).map(|&other| native(other))
    }

    fn session_create(&self, config: &NativeConfig, userdata: Userdata) -> Result<NativePtr, ErrorCode> {
        if config.api_version != API_VERSION {
            return Err(ErrorCode::BadApiVersion);
        }
        if config.application_key.len() != APP_KEY_LEN {
            return Err(ErrorCode::BadApplicationKey);
        }
        let agent = config.user_agent.to_bytes();
        if agent.is_empty() || agent.len() > 255 {
            return Err(ErrorCode::BadUserAgent);
        }
        for location in [&config.cache_location, &config.settings_location] {
            let location = location
                .to_str()
                .map_err(|_| ErrorCode::ApiInitializationFailed)?;
            match Path::new(location).parent() {
                Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                    return Err(ErrorCode::ApiInitializationFailed);
                }
                _ => {}
            }
        }

        let mut state = self.state.lock();
        let session = state.alloc(Kind::Session);
        {
            let object = state.live(session);
            object.loaded = true;
            object.userdata = Some(userdata);
            object.session = Some(SessionState {
                connection: ConnectionState::LoggedOut,
                remembered: None,
                events: Vec::new(),
            });
        }
        for i in 0..2 {
            let friend = state.user(&format!("friend{i}"));
            state.adopt_child(session, Item::Friends, friend);
        }
        Ok(native(session))
    }

    fn session_login(&self, session: NativePtr, username: &CStr, password: &CStr, remember_me: bool) {
        let mut state = self.state.lock();
        let username = text(username);
        if password.to_bytes().is_empty() {
            state
                .session(session.addr())
                .events
                .push(Event::LoggedIn(ErrorCode::BadUsernameOrPassword));
            return;
        }
        state.log_in(session.addr(), &username);
        if remember_me {
            state.session(session.addr()).remembered = Some(username);
        }
    }

    fn session_relogin(&self, session: NativePtr) -> ErrorCode {
        let mut state = self.state.lock();
        match state.session(session.addr()).remembered.clone() {
            Some(username) => {
                state.log_in(session.addr(), &username);
                ErrorCode::Ok
            }
            None => ErrorCode::NoCredentials,
        }
    }

    fn session_remembered_user(&self, session: NativePtr) -> Option<String> {
        self.state.lock().session(session.addr()).remembered.clone()
    }

    fn session_forget_me(&self, session: NativePtr) {
        self.state.lock().session(session.addr()).remembered = None;
    }

    fn session_logout(&self, session: NativePtr) {
        let mut state = self.state.lock();
        let addr = session.addr();
        let dropped: Vec<usize> = {
            let object = state.live_kind(Kind::Session, addr);
            [Relation::User, Relation::Container]
                .iter()
                .filter_map(|relation| object.related.remove(relation))
                .collect()
        };
        for other in dropped {
            state.decref(other);
        }
        let session_state = state.session(addr);
        session_state.connection = ConnectionState::LoggedOut;
        session_state.events.push(Event::LoggedOut);
    }

    fn session_connection_state(&self, session: NativePtr) -> ConnectionState {
        self.state.lock().session(session.addr()).connection
    }

    fn session_set_cache_size(&self, session: NativePtr, megabytes: usize) {
        self.settings(session, format!("cache_size {megabytes}"));
    }

    fn session_process_events(&self, session: NativePtr) -> i32 {
        let (hook, events, userdata) = {
            let mut state = self.state.lock();
            let hook = state.process_hook.take();
            let userdata = state.live_kind(Kind::Session, session.addr()).userdata;
            let events = std::mem::take(&mut state.session(session.addr()).events);
            (hook, events, userdata.unwrap())
        };
        if let Some(hook) = hook {
            hook();
        }
        for event in events {
            unsafe {
                match event {
                    Event::LoggedIn(code) => trampoline::logged_in(userdata, code.as_raw()),
                    Event::LoggedOut => trampoline::logged_out(userdata),
                }
            }
        }
        250
    }

    fn session_inbox_create(&self, session: NativePtr) -> Option<NativePtr> {
        let mut state = self.state.lock();
        Some(native(state.playlist(session.addr(), "inbox", None)))
    }

    fn session_starred_create(&self, session: NativePtr) -> Option<NativePtr> {
        let mut state = self.state.lock();
        Some(native(state.playlist(session.addr(), "starred", None)))
    }

    fn session_starred_for_user_create(&self, session: NativePtr, username: &CStr) -> Option<NativePtr> {
        let mut state = self.state.lock();
        let owner = state.user(&text(username));
        let playlist = state.playlist(session.addr(), "starred", Some(owner));
        // The playlist took its own reference.
        state.decref(owner);
        Some(native(playlist))
    }

    fn session_published_container_for_user_create(
        &self,
        session: NativePtr,
        username: Option<&CStr>,
    ) -> Option<NativePtr> {
        let mut state = self.state.lock();
        let owner = match username {
            Some(name) => state.user(&text(name)),
            None => {
                let user = state.current_user(session.addr())?;
                state.live(user).refcount += 1;
                user
            }
        };
        let container = state.alloc(Kind::PlaylistContainer);
        state.live(container).loaded = true;
        state.adopt_related(container, Relation::User, owner);
        Some(native(container))
    }

    fn session_preferred_bitrate(&self, session: NativePtr, bitrate: Bitrate) {
        self.settings(session, format!("bitrate {bitrate:?}"));
    }

    fn session_preferred_offline_bitrate(&self, session: NativePtr, bitrate: Bitrate, allow_resync: bool) {
        self.settings(session, format!("offline_bitrate {bitrate:?} {allow_resync}"));
    }

    fn session_set_connection_type(&self, session: NativePtr, connection_type: ConnectionType) {
        self.settings(session, format!("connection_type {connection_type:?}"));
    }

    fn session_set_connection_rules(&self, session: NativePtr, rules: u32) {
        self.settings(session, format!("connection_rules {rules}"));
    }

    fn session_user_country(&self, session: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Session, session.addr());
        pack_country("SE")
    }

    fn player_load(&self, session: NativePtr, track: NativePtr) -> ErrorCode {
        self.player(session, Some(track), "load".to_string())
    }

    fn player_seek(&self, session: NativePtr, offset_ms: i32) {
        self.player(session, None, format!("seek {offset_ms}"));
    }

    fn player_play(&self, session: NativePtr, play: bool) {
        self.player(session, None, format!("play {play}"));
    }

    fn player_unload(&self, session: NativePtr) {
        self.player(session, None, "unload".to_string());
    }

    fn player_prefetch(&self, session: NativePtr, track: NativePtr) -> ErrorCode {
        self.player(session, Some(track), "prefetch".to_string())
    }

    fn offline_tracks_to_sync(&self, session: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Session, session.addr());
        3
    }

    fn offline_num_playlists(&self, session: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Session, session.addr());
        1
    }

    fn offline_sync_status(&self, session: NativePtr) -> Option<OfflineSyncStatus> {
        self.state.lock().live_kind(Kind::Session, session.addr());
        Some(OfflineSyncStatus {
            queued_tracks: 3,
            syncing: true,
            ..OfflineSyncStatus::default()
        })
    }

    fn offline_time_left(&self, session: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Session, session.addr());
        3600
    }

    fn track_flag(&self, session: NativePtr, track: NativePtr, flag: TrackFlag) -> bool {
        let mut state = self.state.lock();
        state.live_kind(Kind::Session, session.addr());
        let unplayable = state.unplayable.contains(&track.addr());
        let object = state.live_kind(Kind::Track, track.addr());
        match flag {
            TrackFlag::Available => !unplayable,
            TrackFlag::Local => object.local,
            TrackFlag::Autolinked => false,
            TrackFlag::Starred => object.starred,
        }
    }

    fn track_set_starred(&self, session: NativePtr, tracks: &[NativePtr], star: bool) {
        let mut state = self.state.lock();
        state.live_kind(Kind::Session, session.addr());
        for track in tracks {
            state.live_kind(Kind::Track, track.addr()).starred = star;
        }
    }

    fn track_duration(&self, track: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Track, track.addr()).duration
    }

    fn track_popularity(&self, track: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Track, track.addr());
        0
    }

    fn track_disc(&self, track: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Track, track.addr()).disc
    }

    fn track_index(&self, track: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Track, track.addr()).index
    }

    fn localtrack_create(&self, artist: &CStr, title: &CStr, album: &CStr, length_ms: i32) -> Option<NativePtr> {
        let mut state = self.state.lock();
        let track = state.named(Kind::Track, text(title));
        {
            let object = state.live(track);
            object.local = true;
            object.duration = length_ms.max(0);
            object.disc = 1;
            object.index = 1;
        }
        let artist = state.named(Kind::Artist, text(artist));
        let album = state.named(Kind::Album, text(album));
        state.adopt_child(track, Item::Artists, artist);
        state.share_related(album, Relation::Artist, artist);
        state.adopt_related(track, Relation::Album, album);
        Some(native(track))
    }

    fn album_is_available(&self, album: NativePtr) -> bool {
        self.state.lock().live_kind(Kind::Album, album.addr());
        true
    }

    fn album_year(&self, album: NativePtr) -> i32 {
        self.state.lock().live_kind(Kind::Album, album.addr());
        0
    }

    fn album_type(&self, album: NativePtr) -> AlbumType {
        self.state.lock().live_kind(Kind::Album, album.addr());
        AlbumType::Album
    }

    fn album_cover(&self, album: NativePtr) -> Option<ImageId> {
        self.state.lock().live_kind(Kind::Album, album.addr()).image_id
    }

    fn user_canonical_name(&self, user: NativePtr) -> Option<String> {
        self.state.lock().live_kind(Kind::User, user.addr()).name.clone()
    }

    fn user_display_name(&self, user: NativePtr) -> Option<String> {
        let mut state = self.state.lock();
        let object = state.live_kind(Kind::User, user.addr());
        object.display_name.clone().or_else(|| object.name.clone())
    }

    fn link_create_from_string(&self, link: &CStr) -> Option<NativePtr> {
        let link = text(link);
        let mut parts = link.split('#').next()?.split(':');
        let (Some("spotify"), Some(kind), Some(hex)) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        let addr = usize::from_str_radix(hex, 16).ok()?;
        let (kind, link_type, relation) = match kind {
            "track" => (Kind::Track, LinkType::Track, Relation::Track),
            "album" => (Kind::Album, LinkType::Album, Relation::Album),
            "artist" => (Kind::Artist, LinkType::Artist, Relation::Artist),
            _ => return None,
        };

        let mut state = self.state.lock();
        let target = state.objects.get(&addr)?;
        if target.kind != kind || target.refcount == 0 {
            return None;
        }
        let created = state.alloc(Kind::Link);
        {
            let object = state.live(created);
            object.loaded = true;
            object.link_type = link_type;
            object.text = link;
        }
        state.share_related(created, relation, addr);
        Some(native(created))
    }

    fn link_create_from(&self, kind: Kind, ptr: NativePtr, offset_ms: i32) -> Option<NativePtr> {
        let (prefix, link_type, relation) = match kind {
            Kind::Track => ("track", LinkType::Track, Relation::Track),
            Kind::Album => ("album", LinkType::Album, Relation::Album),
            Kind::Artist => ("artist", LinkType::Artist, Relation::Artist),
            _ => return None,
        };
        let mut uri = format!("spotify:{prefix}:{:016x}", ptr.addr());
        if offset_ms > 0 {
            let seconds = offset_ms / 1000;
            uri.push_str(&format!("#{}:{:02}", seconds / 60, seconds % 60));
        }

        let mut state = self.state.lock();
        state.live_kind(kind, ptr.addr());
        let link = state.alloc(Kind::Link);
        {
            let object = state.live(link);
            object.loaded = true;
            object.link_type = link_type;
            object.text = uri;
        }
        state.share_related(link, relation, ptr.addr());
        Some(native(link))
    }

    fn link_type(&self, link: NativePtr) -> LinkType {
        self.state.lock().live_kind(Kind::Link, link.addr()).link_type
    }

    fn link_as_string(&self, link: NativePtr) -> Option<String> {
        Some(self.state.lock().live_kind(Kind::Link, link.addr()).text.clone())
    }

    fn image_create(&self, session: NativePtr, id: &ImageId) -> Option<NativePtr> {
        let mut state = self.state.lock();
        state.live_kind(Kind::Session, session.addr());
        let image = state.alloc(Kind::Image);
        state.live(image).image_id = Some(*id);
        Some(native(image))
    }

    fn image_format(&self, image: NativePtr) -> ImageFormat {
        self.state.lock().live_kind(Kind::Image, image.addr());
        ImageFormat::Jpeg
    }

    fn image_data(&self, image: NativePtr) -> Vec<u8> {
        if self.is_loaded(Kind::Image, image) {
            vec![0xff, 0xd8, 0xff, 0xe0]
        } else {
            Vec::new()
        }
    }

    fn image_id(&self, image: NativePtr) -> Option<ImageId> {
        self.state.lock().live_kind(Kind::Image, image.addr()).image_id
    }

    fn search_create(&self, session: NativePtr, params: &SearchParams, userdata: Userdata) -> Option<NativePtr> {
        let addr = {
            let mut state = self.state.lock();
            state.live_kind(Kind::Session, session.addr());
            if state.refuse_requests {
                return None;
            }
            let query = text(&params.query);
            let search = state.request(Kind::Search, userdata);
            state.live(search).text = query.clone();
            state.named_children(search, Item::Tracks, Kind::Track, &query);
            search
        };
        self.finish_request(addr)
    }

    fn radio_search_create(
        &self,
        session: NativePtr,
        from_year: u32,
        to_year: u32,
        genres: u32,
        userdata: Userdata,
    ) -> Option<NativePtr> {
        let addr = {
            let mut state = self.state.lock();
            state.live_kind(Kind::Session, session.addr());
            if state.refuse_requests {
                return None;
            }
            state.last_radio_genres = Some(genres);
            let query = format!("radio {from_year}-{to_year}");
            let search = state.request(Kind::Search, userdata);
            state.live(search).text = query.clone();
            state.named_children(search, Item::Tracks, Kind::Track, &query);
            search
        };
        self.finish_request(addr)
    }

    fn search_query(&self, search: NativePtr) -> String {
        self.state.lock().live_kind(Kind::Search, search.addr()).text.clone()
    }

    fn search_did_you_mean(&self, search: NativePtr) -> String {
        self.state.lock().live_kind(Kind::Search, search.addr());
        String::new()
    }

    fn search_total(&self, search: NativePtr, item: Item) -> i32 {
        self.count(Kind::Search, search, item)
    }

    fn albumbrowse_create(&self, session: NativePtr, album: NativePtr, userdata: Userdata) -> Option<NativePtr> {
        let addr = {
            let mut state = self.state.lock();
            state.live_kind(Kind::Session, session.addr());
            if state.refuse_requests {
                return None;
            }
            let (name, artist) = {
                let object = state.live_kind(Kind::Album, album.addr());
                (
                    object.name.clone().unwrap_or_default(),
                    object.related.get(&Relation::Artist).copied(),
                )
            };
            let browse = state.request(Kind::AlbumBrowse, userdata);
            state.live(browse).text = format!("review of {name}");
            state.share_related(browse, Relation::Album, album.addr());
            if let Some(artist) = artist {
                state.share_related(browse, Relation::Artist, artist);
            }
            state.named_children(browse, Item::Tracks, Kind::Track, &name);
            browse
        };
        self.finish_request(addr)
    }

    fn albumbrowse_review(&self, browse: NativePtr) -> String {
        self.state.lock().live_kind(Kind::AlbumBrowse, browse.addr()).text.clone()
    }

    fn artistbrowse_create(
        &self,
        session: NativePtr,
        artist: NativePtr,
        browse_type: ArtistBrowseType,
        userdata: Userdata,
    ) -> Option<NativePtr> {
        let addr = {
            let mut state = self.state.lock();
            state.live_kind(Kind::Session, session.addr());
            if state.refuse_requests {
                return None;
            }
            let name = state
                .live_kind(Kind::Artist, artist.addr())
                .name
                .clone()
                .unwrap_or_default();
            let browse = state.request(Kind::ArtistBrowse, userdata);
            state.live(browse).text = format!("biography of {name}");
            state.share_related(browse, Relation::Artist, artist.addr());
            if browse_type != ArtistBrowseType::NoTracks {
                state.named_children(browse, Item::Tracks, Kind::Track, &name);
            }
            if browse_type != ArtistBrowseType::NoAlbums {
                state.named_children(browse, Item::Albums, Kind::Album, &name);
            }
            state.named_children(browse, Item::SimilarArtists, Kind::Artist, &name);
            browse
        };
        self.finish_request(addr)
    }

    fn artistbrowse_biography(&self, browse: NativePtr) -> String {
        self.state.lock().live_kind(Kind::ArtistBrowse, browse.addr()).text.clone()
    }

    fn toplistbrowse_create(
        &self,
        session: NativePtr,
        toplist_type: ToplistType,
        region: i32,
        username: Option<&CStr>,
        userdata: Userdata,
    ) -> Option<NativePtr> {
        let addr = {
            let mut state = self.state.lock();
            state.live_kind(Kind::Session, session.addr());
            if state.refuse_requests {
                return None;
            }
            state.last_toplist = Some((region, username.map(text)));
            let browse = state.request(Kind::ToplistBrowse, userdata);
            let (item, kind) = match toplist_type {
                ToplistType::Tracks => (Item::Tracks, Kind::Track),
                ToplistType::Albums => (Item::Albums, Kind::Album),
                ToplistType::Artists => (Item::Artists, Kind::Artist),
            };
            state.named_children(browse, item, kind, "top");
            browse
        };
        self.finish_request(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascading_free() {
        let fake = FakeLibrary::new();
        let track = fake
            .localtrack_create(
                &CString::new("a").unwrap(),
                &CString::new("b").unwrap(),
                &CString::new("c").unwrap(),
                -1,
            )
            .unwrap();
        assert_eq!(fake.live_objects(), 3);
        fake.release(Kind::Track, track);
        assert_eq!(fake.live_objects(), 0);
    }

    #[test]
    #[should_panic(expected = "double release")]
    fn test_double_release_panics() {
        let fake = FakeLibrary::new();
        let ptr = fake.add_object(Kind::Image);
        fake.release(Kind::Image, ptr);
        fake.release(Kind::Image, ptr);
    }

    #[test]
    #[should_panic(expected = "use after free")]
    fn test_use_after_free_panics() {
        let fake = FakeLibrary::new();
        let ptr = fake.add_object(Kind::Artist);
        fake.release(Kind::Artist, ptr);
        fake.name(Kind::Artist, ptr);
    }
}
