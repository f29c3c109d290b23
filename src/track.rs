//! Track metadata.

use std::time::Duration;

use crate::error::{Error, ErrorCode, Result};
use crate::handle::{Kind, Live, Wrapper, native_handle};
use crate::lifecycle::Session;
use crate::metadata::{Album, Artist};
use crate::native::{Item, Library, NativePtr, Relation, TrackFlag};
use crate::util::{millis, to_cstring, to_millis};

native_handle!(
    /// A track.
    ///
    /// Metadata is available once [`Track::is_loaded`] returns true; until
    /// then accessors return empty values.
    Track => Track
);

impl Track {
    /// Create a track for a local file that is not in the catalogue.
    ///
    /// libspotify tries to match it against the catalogue. `length` of
    /// `None` means unknown.
    pub fn local(
        session: &Session,
        artist: &str,
        title: &str,
        album: &str,
        length: Option<Duration>,
    ) -> Result<Track> {
        let _session = session.ptr()?;
        let artist = to_cstring(artist, "artist")?;
        let title = to_cstring(title, "title")?;
        let album = to_cstring(album, "album")?;
        let length_ms = length.map_or(-1, to_millis);

        let library = session.library().clone();
        let ptr = library
            .localtrack_create(&artist, &title, &album, length_ms)
            .ok_or(Error::NativeNull {
                operation: "localtrack_create",
            })?;
        Ok(Track::from_owned(library, ptr))
    }

    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    /// Load error of the track; `ErrorCode::IsLoading` while pending.
    pub fn error(&self) -> Result<ErrorCode> {
        self.raw.with(|lib, ptr| lib.load_error(Kind::Track, ptr))
    }

    /// Whether the track can be played in this session.
    pub fn is_available(&self, session: &Session) -> Result<bool> {
        self.flag(session, TrackFlag::Available)
    }

    pub fn is_local(&self, session: &Session) -> Result<bool> {
        self.flag(session, TrackFlag::Local)
    }

    /// Whether the track was replaced by a playable equivalent.
    pub fn is_autolinked(&self, session: &Session) -> Result<bool> {
        self.flag(session, TrackFlag::Autolinked)
    }

    pub fn is_starred(&self, session: &Session) -> Result<bool> {
        self.flag(session, TrackFlag::Starred)
    }

    /// Star or unstar a set of tracks.
    pub fn set_starred(session: &Session, tracks: &[Track], star: bool) -> Result<()> {
        let session_ptr = session.ptr()?;
        let live = tracks
            .iter()
            .map(|track| track.raw.get())
            .collect::<Result<Vec<Live<'_>>>>()?;
        let ptrs: Vec<NativePtr> = live.iter().map(|ptr| **ptr).collect();
        session
            .library()
            .track_set_starred(*session_ptr, &ptrs, star);
        Ok(())
    }

    pub fn num_artists(&self) -> Result<usize> {
        self.raw.count(Item::Artists)
    }

    pub fn artist(&self, index: usize) -> Result<Option<Artist>> {
        self.raw.item(Item::Artists, index)
    }

    pub fn album(&self) -> Result<Option<Album>> {
        self.raw.related(Relation::Album)
    }

    /// Track name; empty while loading.
    pub fn name(&self) -> Result<String> {
        self.raw
            .with(|lib, ptr| lib.name(Kind::Track, ptr).unwrap_or_default())
    }

    pub fn duration(&self) -> Result<Duration> {
        self.raw.with(|lib, ptr| millis(lib.track_duration(ptr)))
    }

    /// Popularity in the range 0-100.
    pub fn popularity(&self) -> Result<u32> {
        self.int(|lib, ptr| lib.track_popularity(ptr))
    }

    pub fn disc(&self) -> Result<u32> {
        self.int(|lib, ptr| lib.track_disc(ptr))
    }

    /// Position on its disc, starting at 1.
    pub fn index(&self) -> Result<u32> {
        self.int(|lib, ptr| lib.track_index(ptr))
    }

    fn flag(&self, session: &Session, flag: TrackFlag) -> Result<bool> {
        let session_ptr = session.ptr()?;
        self.raw
            .with(|lib, ptr| lib.track_flag(*session_ptr, ptr, flag))
    }

    fn int(&self, f: impl FnOnce(&dyn Library, NativePtr) -> i32) -> Result<u32> {
        self.raw
            .with(|lib, ptr| u32::try_from(f(lib, ptr)).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::callbacks::NoCallbacks;
    use crate::testing::{FakeLibrary, test_config};

    fn session() -> (Arc<FakeLibrary>, Session, tempfile::TempDir) {
        let fake = Arc::new(FakeLibrary::new());
        let (config, dir) = test_config();
        let session = Session::create_with(fake.clone(), &config, Arc::new(NoCallbacks)).unwrap();
        (fake, session, dir)
    }

    #[test]
    fn test_local_track_properties() {
        let (fake, session, _dir) = session();
        let track = Track::local(
            &session,
            "Miles Davis",
            "So What",
            "Kind of Blue",
            Some(Duration::from_millis(562_000)),
        )
        .unwrap();

        assert!(track.is_loaded().unwrap());
        assert_eq!(track.error().unwrap(), ErrorCode::Ok);
        assert_eq!(track.name().unwrap(), "So What");
        assert_eq!(track.duration().unwrap(), Duration::from_millis(562_000));
        assert!(track.is_local(&session).unwrap());
        assert!(track.is_available(&session).unwrap());
        assert!(!track.is_autolinked(&session).unwrap());
        assert_eq!(track.disc().unwrap(), 1);
        assert_eq!(track.index().unwrap(), 1);
        assert_eq!(track.popularity().unwrap(), 0);

        assert_eq!(track.num_artists().unwrap(), 1);
        let artist = track.artist(0).unwrap().unwrap();
        assert_eq!(artist.name().unwrap(), "Miles Davis");
        assert!(track.artist(1).unwrap().is_none());
        let album = track.album().unwrap().unwrap();
        assert_eq!(album.name().unwrap(), "Kind of Blue");

        let ptr = track.raw().peek().unwrap();
        track.release();
        assert!(track.name().unwrap_err().is_null_handle());
        assert!(track.is_local(&session).unwrap_err().is_null_handle());
        assert_eq!(fake.releases(ptr), 1);
    }

    #[test]
    fn test_starring() {
        let (_fake, session, _dir) = session();
        let first = Track::local(&session, "a", "one", "x", None).unwrap();
        let second = Track::local(&session, "a", "two", "x", None).unwrap();
        assert_eq!(first.duration().unwrap(), Duration::ZERO);

        Track::set_starred(&session, &[first.clone(), second.clone()], true).unwrap();
        assert!(first.is_starred(&session).unwrap());
        assert!(second.is_starred(&session).unwrap());

        Track::set_starred(&session, &[second.clone()], false).unwrap();
        assert!(!second.is_starred(&session).unwrap());

        second.release();
        let err = Track::set_starred(&session, &[first, second], true).unwrap_err();
        assert!(err.is_null_handle());
    }

    #[test]
    fn test_clone_identity() {
        let (fake, session, _dir) = session();
        let track = Track::local(&session, "a", "b", "c", None).unwrap();
        let ptr = track.raw().peek().unwrap();
        let album = track.album().unwrap().unwrap();
        let copy = track.clone();

        assert_eq!(track, copy);
        assert_eq!(track.id(), copy.id());
        assert_eq!(fake.refcount(ptr), 2);
        assert_eq!(album.id().unwrap().kind, Kind::Album);

        drop(copy);
        drop(track);
        assert_eq!(fake.refcount(ptr), 0);
    }

    #[test]
    fn test_invalid_string_is_rejected_before_native_call() {
        let (fake, session, _dir) = session();
        let before = fake.live_objects();
        let err = Track::local(&session, "a\0", "b", "c", None).unwrap_err();
        assert!(matches!(err, Error::InvalidString { param: "artist" }));
        assert_eq!(fake.live_objects(), before);
    }

    #[test]
    fn test_local_track_on_released_session() {
        let (fake, session, _dir) = session();
        session.release();
        let before = fake.live_objects();

        let err = Track::local(&session, "a", "b", "c", None).unwrap_err();
        assert!(matches!(err, Error::NullHandle { kind: Kind::Session }));
        assert_eq!(fake.live_objects(), before);
    }
}
