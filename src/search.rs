//! Search functions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::handle::Kind;
use crate::lifecycle::Session;
use crate::metadata::{Album, Artist};
use crate::native::{Item, SearchParams};
use crate::pending::{self, request_handle};
use crate::track::Track;
use crate::types::{RadioGenre, bit_mask};
use crate::util::{count, to_cstring};

/// Search request.
///
/// # JSON Schema
///
/// ```json
/// {
///   "query": "artist:miles davis",
///   "track_offset": 0,
///   "track_count": 20,
///   "album_offset": 0,
///   "album_count": 10,
///   "artist_offset": 0,
///   "artist_count": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Query in the service's search syntax
    pub query: String,
    #[serde(default)]
    pub track_offset: u32,
    /// Maximum number of tracks (default: 20)
    #[serde(default = "default_track_count")]
    pub track_count: u32,
    #[serde(default)]
    pub album_offset: u32,
    /// Maximum number of albums (default: 10)
    #[serde(default = "default_count")]
    pub album_count: u32,
    #[serde(default)]
    pub artist_offset: u32,
    /// Maximum number of artists (default: 10)
    #[serde(default = "default_count")]
    pub artist_count: u32,
}

fn default_track_count() -> u32 {
    20
}

fn default_count() -> u32 {
    10
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            track_offset: 0,
            track_count: default_track_count(),
            album_offset: 0,
            album_count: default_count(),
            artist_offset: 0,
            artist_count: default_count(),
        }
    }

    fn to_native(&self) -> Result<SearchParams> {
        let clamp = |n: u32| i32::try_from(n).unwrap_or(i32::MAX);
        Ok(SearchParams {
            query: to_cstring(&self.query, "query")?,
            track_offset: clamp(self.track_offset),
            track_count: clamp(self.track_count),
            album_offset: clamp(self.album_offset),
            album_count: clamp(self.album_count),
            artist_offset: clamp(self.artist_offset),
            artist_count: clamp(self.artist_count),
        })
    }
}

request_handle!(
    /// A search request and, once loaded, its results.
    ///
    /// The completion callback runs exactly once unless the search is
    /// released first. The search stays alive until then even if every
    /// clone is dropped.
    Search
);

impl Search {
    /// Start a search.
    ///
    /// # Errors
    ///
    /// `Error::NullHandle` if the session was released,
    /// `Error::InvalidString` if the query contains a NUL byte.
    pub fn create(
        session: &Session,
        query: &SearchQuery,
        on_complete: impl FnOnce(&Search) + Send + 'static,
    ) -> Result<Search> {
        session.ptr()?;
        let params = query.to_native()?;
        debug!(query = %query.query, "search_create");

        pending::issue(
            Kind::Search,
            "search_create",
            session.library().clone(),
            Box::new(on_complete),
            |lib, userdata| {
                let session_ptr = session.ptr()?;
                Ok(lib.search_create(*session_ptr, &params, userdata))
            },
            |inner| Search { inner },
        )
    }

    /// Start a radio search: tracks from the given years and genres.
    pub fn radio(
        session: &Session,
        from_year: u32,
        to_year: u32,
        genres: &[RadioGenre],
        on_complete: impl FnOnce(&Search) + Send + 'static,
    ) -> Result<Search> {
        let mask = bit_mask(genres);
        debug!(from_year, to_year, genres = mask, "radio_search_create");

        pending::issue(
            Kind::Search,
            "radio_search_create",
            session.library().clone(),
            Box::new(on_complete),
            |lib, userdata| {
                let session_ptr = session.ptr()?;
                Ok(lib.radio_search_create(*session_ptr, from_year, to_year, mask, userdata))
            },
            |inner| Search { inner },
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

    /// The query as understood by the service.
    pub fn query(&self) -> Result<String> {
        self.inner.raw.with(|lib, ptr| lib.search_query(ptr))
    }

    /// Spelling suggestion, empty when there is none.
    pub fn did_you_mean(&self) -> Result<String> {
        self.inner.raw.with(|lib, ptr| lib.search_did_you_mean(ptr))
    }

    /// Total number of matching tracks, beyond the requested window.
    pub fn total_tracks(&self) -> Result<usize> {
        self.total(Item::Tracks)
    }

    pub fn total_albums(&self) -> Result<usize> {
        self.total(Item::Albums)
    }

    pub fn total_artists(&self) -> Result<usize> {
        self.total(Item::Artists)
    }

    fn total(&self, item: Item) -> Result<usize> {
        self.inner
            .raw
            .with(|lib, ptr| count(lib.search_total(ptr, item)))
    }
}
