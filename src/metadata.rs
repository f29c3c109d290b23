//! Album, artist, user, link, image and playlist handles.

use std::time::Duration;

use crate::error::{Error, ErrorCode, Result};
use crate::handle::{Kind, RawHandle, Wrapper, native_handle};
use crate::lifecycle::Session;
use crate::native::{Item, Relation};
use crate::track::Track;
use crate::types::{AlbumType, ImageFormat, ImageId, LinkType};
use crate::util::{to_cstring, to_millis};

native_handle!(
    /// An album.
    Album => Album
);

native_handle!(
    /// An artist.
    Artist => Artist
);

native_handle!(
    /// A user of the service.
    User => User
);

native_handle!(
    /// A Spotify URI (`spotify:track:...`) and what it points to.
    Link => Link
);

native_handle!(
    /// Cover art or a portrait, loaded asynchronously.
    Image => Image
);

native_handle!(Playlist => Playlist);

native_handle!(
    /// The playlists of a user.
    PlaylistContainer => PlaylistContainer
);

fn name_of(raw: &RawHandle) -> Result<String> {
    let kind = raw.kind();
    raw.with(|lib, ptr| lib.name(kind, ptr).unwrap_or_default())
}

impl Album {
    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    /// Whether the album can be played in the user's region.
    pub fn is_available(&self) -> Result<bool> {
        self.raw.with(|lib, ptr| lib.album_is_available(ptr))
    }

    pub fn name(&self) -> Result<String> {
        name_of(&self.raw)
    }

    pub fn artist(&self) -> Result<Option<Artist>> {
        self.raw.related(Relation::Artist)
    }

    /// Release year, 0 when unknown.
    pub fn year(&self) -> Result<u32> {
        self.raw
            .with(|lib, ptr| u32::try_from(lib.album_year(ptr)).unwrap_or(0))
    }

    pub fn album_type(&self) -> Result<AlbumType> {
        self.raw.with(|lib, ptr| lib.album_type(ptr))
    }

    /// Identifier of the cover image, if the album has one.
    pub fn cover(&self) -> Result<Option<ImageId>> {
        self.raw.with(|lib, ptr| lib.album_cover(ptr))
    }
}

impl Artist {
    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    pub fn name(&self) -> Result<String> {
        name_of(&self.raw)
    }
}

impl User {
    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    /// The login name, stable across display name changes.
    pub fn canonical_name(&self) -> Result<String> {
        self.raw
            .with(|lib, ptr| lib.user_canonical_name(ptr).unwrap_or_default())
    }

    /// The name to show; falls back to the canonical name.
    pub fn display_name(&self) -> Result<String> {
        self.raw
            .with(|lib, ptr| lib.user_display_name(ptr).unwrap_or_default())
    }
}

impl Link {
    /// Parse a Spotify URI.
    ///
    /// # Errors
    ///
    /// `Error::NativeNull` when libspotify does not recognize the link.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(session: &Session, link: &str) -> Result<Link> {
        session.ptr()?;
        let link = to_cstring(link, "link")?;
        let library = session.library().clone();
        let ptr = library
            .link_create_from_string(&link)
            .ok_or(Error::NativeNull {
                operation: "link_create_from_string",
            })?;
        Ok(Link::from_owned(library, ptr))
    }

    /// Link to a track, starting playback at `offset`.
    pub fn from_track(track: &Track, offset: Duration) -> Result<Link> {
        Self::create_from(track.raw(), to_millis(offset), "link_create_from_track")
    }

    pub fn from_album(album: &Album) -> Result<Link> {
        Self::create_from(&album.raw, 0, "link_create_from_album")
    }

    pub fn from_artist(artist: &Artist) -> Result<Link> {
        Self::create_from(&artist.raw, 0, "link_create_from_artist")
    }

    fn create_from(target: &RawHandle, offset_ms: i32, operation: &'static str) -> Result<Link> {
        let kind = target.kind();
        let ptr = target
            .with(|lib, ptr| lib.link_create_from(kind, ptr, offset_ms))?
            .ok_or(Error::NativeNull { operation })?;
        Ok(Link::from_owned(target.library().clone(), ptr))
    }

    pub fn link_type(&self) -> Result<LinkType> {
        self.raw.with(|lib, ptr| lib.link_type(ptr))
    }

    /// The URI as text.
    pub fn as_string(&self) -> Result<String> {
        self.raw
            .with(|lib, ptr| lib.link_as_string(ptr).unwrap_or_default())
    }

    /// The linked track, `None` if the link is not a track link.
    pub fn as_track(&self) -> Result<Option<Track>> {
        self.raw.related(Relation::Track)
    }

    pub fn as_album(&self) -> Result<Option<Album>> {
        self.raw.related(Relation::Album)
    }

    pub fn as_artist(&self) -> Result<Option<Artist>> {
        self.raw.related(Relation::Artist)
    }

    pub fn as_user(&self) -> Result<Option<User>> {
        self.raw.related(Relation::User)
    }
}

impl Image {
    /// Start loading the image with the given identifier.
    pub fn create(session: &Session, id: &ImageId) -> Result<Image> {
        let session_ptr = session.ptr()?;
        let library = session.library().clone();
        let ptr = library
            .image_create(*session_ptr, id)
            .ok_or(Error::NativeNull {
                operation: "image_create",
            })?;
        Ok(Image::from_owned(library, ptr))
    }

    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    pub fn error(&self) -> Result<ErrorCode> {
        self.raw.with(|lib, ptr| lib.load_error(Kind::Image, ptr))
    }

    pub fn format(&self) -> Result<ImageFormat> {
        self.raw.with(|lib, ptr| lib.image_format(ptr))
    }

    /// Encoded image bytes, empty until loaded.
    pub fn data(&self) -> Result<Vec<u8>> {
        self.raw.with(|lib, ptr| lib.image_data(ptr))
    }

    pub fn image_id(&self) -> Result<Option<ImageId>> {
        self.raw.with(|lib, ptr| lib.image_id(ptr))
    }
}

impl Playlist {
    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    pub fn name(&self) -> Result<String> {
        name_of(&self.raw)
    }

    pub fn num_tracks(&self) -> Result<usize> {
        self.raw.count(Item::Tracks)
    }

    pub fn track(&self, index: usize) -> Result<Option<Track>> {
        self.raw.item(Item::Tracks, index)
    }

    pub fn owner(&self) -> Result<Option<User>> {
        self.raw.related(Relation::User)
    }
}

impl PlaylistContainer {
    pub fn is_loaded(&self) -> Result<bool> {
        self.raw.is_loaded()
    }

    pub fn num_playlists(&self) -> Result<usize> {
        self.raw.count(Item::Playlists)
    }

    pub fn playlist(&self, index: usize) -> Result<Option<Playlist>> {
        self.raw.item(Item::Playlists, index)
    }

    pub fn owner(&self) -> Result<Option<User>> {
        self.raw.related(Relation::User)
    }
}
