//! Session operations: login, player transport, playlists, offline sync.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::handle::Wrapper;
use crate::lifecycle::Session;
use crate::metadata::{Playlist, PlaylistContainer, User};
use crate::native::{Item, NativePtr, Relation};
use crate::runtime;
use crate::track::Track;
use crate::types::{
    Bitrate, ConnectionRule, ConnectionState, ConnectionType, OfflineSyncStatus, bit_mask,
    unpack_country,
};
use crate::util::{count, millis, to_cstring, to_millis};

impl Session {
    /// Start logging in. The outcome arrives through
    /// `SessionCallbacks::logged_in`.
    pub fn login(&self, username: &str, password: &str, remember_me: bool) -> Result<()> {
        let ptr = self.ptr()?;
        let username_c = to_cstring(username, "username")?;
        let password = to_cstring(password, "password")?;
        info!(username, remember_me, "logging in");
        self.library()
            .session_login(*ptr, &username_c, &password, remember_me);
        Ok(())
    }

    /// Log in again with stored credentials.
    ///
    /// # Errors
    ///
    /// `Error::Native` with `ErrorCode::NoCredentials` when nothing is stored.
    pub fn relogin(&self) -> Result<()> {
        let ptr = self.ptr()?;
        self.library()
            .session_relogin(*ptr)
            .check("session_relogin")
    }

    /// User whose credentials are stored, if any.
    pub fn remembered_user(&self) -> Result<Option<String>> {
        let ptr = self.ptr()?;
        Ok(self.library().session_remembered_user(*ptr))
    }

    /// Remove the stored credentials.
    pub fn forget_me(&self) -> Result<()> {
        let ptr = self.ptr()?;
        self.library().session_forget_me(*ptr);
        Ok(())
    }

    /// The logged-in user.
    pub fn user(&self) -> Result<Option<User>> {
        self.raw().related(Relation::User)
    }

    pub fn logout(&self) -> Result<()> {
        let ptr = self.ptr()?;
        info!("logging out");
        self.library().session_logout(*ptr);
        Ok(())
    }

    pub fn connection_state(&self) -> Result<ConnectionState> {
        let ptr = self.ptr()?;
        Ok(self.library().session_connection_state(*ptr))
    }

    /// Cache size limit in megabytes; 0 lets libspotify decide.
    pub fn set_cache_size(&self, megabytes: usize) -> Result<()> {
        let ptr = self.ptr()?;
        self.library().session_set_cache_size(*ptr, megabytes);
        Ok(())
    }

    /// Let libspotify do its pending work.
    ///
    /// Returns the delay before the next call is due. Callbacks fired on
    /// other threads during the call may run: the runtime is given up for
    /// its duration. A release from another thread waits for the call to
    /// return.
    pub fn process_events(&self) -> Result<Duration> {
        let ptr = self.ptr()?;
        let library = self.library().clone();
        let next = runtime::blocking(|| library.session_process_events(*ptr));
        drop(ptr);
        self.release_deferred();
        Ok(millis(next))
    }

    /// Load a track into the player.
    pub fn player_load(&self, track: &Track) -> Result<()> {
        let ptr = self.ptr()?;
        let track = track.raw().get()?;
        self.library()
            .player_load(*ptr, *track)
            .check("player_load")
    }

    pub fn player_seek(&self, offset: Duration) -> Result<()> {
        let ptr = self.ptr()?;
        self.library().player_seek(*ptr, to_millis(offset));
        Ok(())
    }

    /// Play (`true`) or pause (`false`) the loaded track.
    pub fn player_play(&self, play: bool) -> Result<()> {
        let ptr = self.ptr()?;
        self.library().player_play(*ptr, play);
        Ok(())
    }

    pub fn player_unload(&self) -> Result<()> {
        let ptr = self.ptr()?;
        self.library().player_unload(*ptr);
        Ok(())
    }

    /// Hint that `track` will be played soon.
    pub fn player_prefetch(&self, track: &Track) -> Result<()> {
        let ptr = self.ptr()?;
        let track = track.raw().get()?;
        self.library()
            .player_prefetch(*ptr, *track)
            .check("player_prefetch")
    }

    /// Playlists of the logged-in user.
    pub fn playlist_container(&self) -> Result<Option<PlaylistContainer>> {
        self.raw().related(Relation::Container)
    }

    pub fn inbox_create(&self) -> Result<Playlist> {
        let ptr = self.ptr()?;
        self.owned(
            self.library().session_inbox_create(*ptr),
            "session_inbox_create",
        )
    }

    pub fn starred_create(&self) -> Result<Playlist> {
        let ptr = self.ptr()?;
        self.owned(
            self.library().session_starred_create(*ptr),
            "session_starred_create",
        )
    }

    pub fn starred_for_user_create(&self, username: &str) -> Result<Playlist> {
        let ptr = self.ptr()?;
        let username = to_cstring(username, "username")?;
        self.owned(
            self.library()
                .session_starred_for_user_create(*ptr, &username),
            "session_starred_for_user_create",
        )
    }

    /// Published playlists of `username`, or of the logged-in user.
    pub fn published_container_for_user_create(
        &self,
        username: Option<&str>,
    ) -> Result<PlaylistContainer> {
        let ptr = self.ptr()?;
        let username = username
            .map(|name| to_cstring(name, "username"))
            .transpose()?;
        self.owned(
            self.library()
                .session_published_container_for_user_create(*ptr, username.as_deref()),
            "session_publishedcontainer_for_user_create",
        )
    }

    pub fn preferred_bitrate(&self, bitrate: Bitrate) -> Result<()> {
        let ptr = self.ptr()?;
        self.library().session_preferred_bitrate(*ptr, bitrate);
        Ok(())
    }

    /// Bitrate of tracks synced for offline use; `allow_resync` re-downloads
    /// tracks synced at another bitrate.
    pub fn preferred_offline_bitrate(&self, bitrate: Bitrate, allow_resync: bool) -> Result<()> {
        let ptr = self.ptr()?;
        self.library()
            .session_preferred_offline_bitrate(*ptr, bitrate, allow_resync);
        Ok(())
    }

    pub fn num_friends(&self) -> Result<usize> {
        self.raw().count(Item::Friends)
    }

    pub fn friend(&self, index: usize) -> Result<Option<User>> {
        self.raw().item(Item::Friends, index)
    }

    pub fn set_connection_type(&self, connection_type: ConnectionType) -> Result<()> {
        let ptr = self.ptr()?;
        self.library()
            .session_set_connection_type(*ptr, connection_type);
        Ok(())
    }

    pub fn set_connection_rules(&self, rules: &[ConnectionRule]) -> Result<()> {
        let ptr = self.ptr()?;
        let mask = bit_mask(rules);
        debug!(rules = mask, "set_connection_rules");
        self.library().session_set_connection_rules(*ptr, mask);
        Ok(())
    }

    /// Tracks still to be downloaded for offline use.
    pub fn offline_tracks_to_sync(&self) -> Result<usize> {
        let ptr = self.ptr()?;
        Ok(count(self.library().offline_tracks_to_sync(*ptr)))
    }

    pub fn offline_num_playlists(&self) -> Result<usize> {
        let ptr = self.ptr()?;
        Ok(count(self.library().offline_num_playlists(*ptr)))
    }

    /// Progress of the running sync, `None` when nothing is syncing.
    pub fn offline_sync_status(&self) -> Result<Option<OfflineSyncStatus>> {
        let ptr = self.ptr()?;
        Ok(self.library().offline_sync_status(*ptr))
    }

    /// Time until the offline key expires and the user must go online.
    pub fn offline_time_left(&self) -> Result<Duration> {
        let ptr = self.ptr()?;
        let seconds = self.library().offline_time_left(*ptr);
        Ok(Duration::from_secs(u64::try_from(seconds).unwrap_or(0)))
    }

    /// Two-letter country code of the logged-in user.
    pub fn user_country(&self) -> Result<Option<String>> {
        let ptr = self.ptr()?;
        Ok(unpack_country(self.library().session_user_country(*ptr)))
    }

    fn owned<T: Wrapper>(&self, ptr: Option<NativePtr>, operation: &'static str) -> Result<T> {
        ptr.map(|ptr| T::from_owned(self.library().clone(), ptr))
            .ok_or(Error::NativeNull { operation })
    }
}
