//! Album, artist and toplist browsing.
//!
//! Each browse is an asynchronous request like [`crate::Search`]: the
//! completion callback runs once the result is loaded, and releasing the
//! browse before that abandons it.

use tracing::debug;

use crate::error::Result;
use crate::handle::Kind;
use crate::lifecycle::Session;
use crate::metadata::{Album, Artist};
use crate::native::{Item, Relation};
use crate::pending::{self, request_handle};
use crate::track::Track;
use crate::types::{ArtistBrowseType, ToplistRegion, ToplistType};
use crate::util::to_cstring;

request_handle!(
    /// Tracks and review of an album.
    AlbumBrowse
);

request_handle!(
    /// Discography, portraits and biography of an artist.
    ArtistBrowse
);

request_handle!(
    /// Most popular tracks, albums or artists in a region.
    ToplistBrowse
);

impl AlbumBrowse {
    pub fn create(
        session: &Session,
        album: &Album,
        on_complete: impl FnOnce(&AlbumBrowse) + Send + 'static,
    ) -> Result<AlbumBrowse> {
        pending::issue(
            Kind::AlbumBrowse,
            "albumbrowse_create",
            session.library().clone(),
            Box::new(on_complete),
            |lib, userdata| {
                let session_ptr = session.ptr()?;
                let album_ptr = album.raw().get()?;
                Ok(lib.albumbrowse_create(*session_ptr, *album_ptr, userdata))
            },
            |inner| AlbumBrowse { inner },
        )
    }

    pub fn album(&self) -> Result<Option<Album>> {
        self.inner.raw.related(Relation::Album)
    }

    pub fn artist(&self) -> Result<Option<Artist>> {
        self.inner.raw.related(Relation::Artist)
    }

    pub fn num_tracks(&self) -> Result<usize> {
        self.inner.raw.count(Item::Tracks)
    }

    pub fn track(&self, index: usize) -> Result<Option<Track>> {
        self.inner.raw.item(Item::Tracks, index)
    }

    pub fn review(&self) -> Result<String> {
        self.inner.raw.with(|lib, ptr| lib.albumbrowse_review(ptr))
    }
}

impl ArtistBrowse {
    pub fn create(
        session: &Session,
        artist: &Artist,
        browse_type: ArtistBrowseType,
        on_complete: impl FnOnce(&ArtistBrowse) + Send + 'static,
    ) -> Result<ArtistBrowse> {
        pending::issue(
            Kind::ArtistBrowse,
            "artistbrowse_create",
            session.library().clone(),
            Box::new(on_complete),
            |lib, userdata| {
                let session_ptr = session.ptr()?;
                let artist_ptr = artist.raw().get()?;
                Ok(lib.artistbrowse_create(*session_ptr, *artist_ptr, browse_type, userdata))
            },
            |inner| ArtistBrowse { inner },
        )
    }

    pub fn artist(&self) -> Result<Option<Artist>> {
        self.inner.raw.related(Relation::Artist)
    }

    pub fn num_tracks(&self) -> Result<usize> {
        self.inner.raw.count(Item::Tracks)
    }

    pub fn track(&self, index: usize) -> Result<Option<Track>> {
        self.inner.raw.item(Item::Tracks, index)
    }

    pub fn num_albums(&self) -> Result<usize> {
        self.inner.raw.count(Item::Albums)
    }

    pub fn album(&self, index: usize) -> Result<Option<Album>> {
        self.inner.raw.item(Item::Albums, index)
    }

    pub fn num_similar_artists(&self) -> Result<usize> {
        self.inner.raw.count(Item::SimilarArtists)
    }

    pub fn similar_artist(&self, index: usize) -> Result<Option<Artist>> {
        self.inner.raw.item(Item::SimilarArtists, index)
    }

    pub fn biography(&self) -> Result<String> {
        self.inner.raw.with(|lib, ptr| lib.artistbrowse_biography(ptr))
    }
}

impl ToplistBrowse {
    pub fn create(
        session: &Session,
        toplist_type: ToplistType,
        region: &ToplistRegion,
        on_complete: impl FnOnce(&ToplistBrowse) + Send + 'static,
    ) -> Result<ToplistBrowse> {
        session.ptr()?;
        let username = match region {
            ToplistRegion::User(Some(name)) => Some(to_cstring(name, "username")?),
            _ => None,
        };
        let raw_region = region.as_raw();
        debug!(?toplist_type, ?region, "toplistbrowse_create");

        pending::issue(
            Kind::ToplistBrowse,
            "toplistbrowse_create",
            session.library().clone(),
            Box::new(on_complete),
            |lib, userdata| {
                let session_ptr = session.ptr()?;
                Ok(lib.toplistbrowse_create(
                    *session_ptr,
                    toplist_type,
                    raw_region,
                    username.as_deref(),
                    userdata,
                ))
            },
            |inner| ToplistBrowse { inner },
        )
    }

    pub fn num_tracks(&self) -> Result<usize> {
        self.inner.raw.count(Item::Tracks)
    }

    pub fn track(&self, index: usize) -> Result<Option<Track>> {
        self.inner.raw.item(Item::Tracks, index)
    }

    pub fn num_albums(&self) -> Result<usize> {
        self.inner.raw.count(Item::Albums)
    }

    pub fn album(&self, index: usize) -> Result<Option<Album>> {
        self.inner.raw.item(Item::Albums, index)
    }

    pub fn num_artists(&self) -> Result<usize> {
        self.inner.raw.count(Item::Artists)
    }

    pub fn artist(&self, index: usize) -> Result<Option<Artist>> {
        self.inner.raw.item(Item::Artists, index)
    }
}
