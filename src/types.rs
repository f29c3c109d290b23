//! Value types mirrored from libspotify.
//!
//! Enumerations keep the native discriminants so they can be passed through
//! unchanged; unknown values coming back from the library are preserved
//! rather than rejected.

use serde::{Deserialize, Serialize};

/// Current connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    LoggedOut,
    LoggedIn,
    Disconnected,
    Undefined,
    Offline,
}

impl ConnectionState {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::LoggedOut,
            1 => Self::LoggedIn,
            2 => Self::Disconnected,
            4 => Self::Offline,
            _ => Self::Undefined,
        }
    }
}

/// Type of network connection the device is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Unknown = 0,
    None = 1,
    Mobile = 2,
    MobileRoaming = 3,
    Wifi = 4,
    Wired = 5,
}

/// Rules deciding when the session may use the network.
///
/// The discriminant is the bit index in the native mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRule {
    Network = 0,
    NetworkIfRoaming = 1,
    AllowSyncOverMobile = 2,
    AllowSyncOverWifi = 3,
}

/// Streaming bitrate preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bitrate {
    #[serde(rename = "160k")]
    Kbps160 = 0,
    #[serde(rename = "320k")]
    Kbps320 = 1,
    #[serde(rename = "96k")]
    Kbps96 = 2,
}

/// Sample encoding of delivered audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleType {
    Int16NativeEndian,
    Other(i32),
}

impl SampleType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Int16NativeEndian,
            other => Self::Other(other),
        }
    }
}

/// Format of a block of delivered audio frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioFormat {
    pub sample_type: SampleType,
    pub sample_rate: i32,
    pub channels: i32,
}

impl AudioFormat {
    /// Bytes per frame, or `None` when the sample type is unknown.
    pub fn frame_size(&self) -> Option<usize> {
        match self.sample_type {
            SampleType::Int16NativeEndian => usize::try_from(self.channels).ok().map(|c| c * 2),
            SampleType::Other(_) => None,
        }
    }
}

/// Buffer statistics reported back to the native player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AudioBufferStats {
    /// Samples currently buffered
    pub samples: i32,
    /// Samples lost to stutter since the last query
    pub stutter: i32,
}

/// Offline synchronization progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OfflineSyncStatus {
    pub queued_tracks: i32,
    pub queued_bytes: u64,
    pub done_tracks: i32,
    pub done_bytes: u64,
    pub copied_tracks: i32,
    pub copied_bytes: u64,
    pub willnotcopy_tracks: i32,
    pub error_tracks: i32,
    pub syncing: bool,
}

/// Kind of object a link points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkType {
    Invalid,
    Track,
    Album,
    Artist,
    Search,
    Playlist,
    Profile,
    Starred,
    LocalTrack,
    Image,
}

impl LinkType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Track,
            2 => Self::Album,
            3 => Self::Artist,
            4 => Self::Search,
            5 => Self::Playlist,
            6 => Self::Profile,
            7 => Self::Starred,
            8 => Self::LocalTrack,
            9 => Self::Image,
            _ => Self::Invalid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlbumType {
    Album,
    Single,
    Compilation,
    Unknown,
}

impl AlbumType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Album,
            1 => Self::Single,
            2 => Self::Compilation,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    Jpeg,
    Unknown,
}

impl ImageFormat {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Jpeg,
            _ => Self::Unknown,
        }
    }
}

/// Native image identifier: a fixed-length 20 byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageId(pub [u8; 20]);

impl ImageId {
    pub const LEN: usize = 20;

    /// Copy an identifier out of a native buffer of at least 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let id: [u8; Self::LEN] = bytes.get(..Self::LEN)?.try_into().ok()?;
        Some(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

/// How much an artist browse should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtistBrowseType {
    #[default]
    Full = 0,
    NoTracks = 1,
    NoAlbums = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToplistType {
    Artists = 0,
    Albums = 1,
    Tracks = 2,
}

/// Region a toplist is computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToplistRegion {
    Everywhere,
    /// Toplist of the given user (`None` for the logged-in user)
    User(Option<String>),
    /// Two-letter country code
    Country(String),
}

impl ToplistRegion {
    /// The native region value: 0, 1 or a packed country code.
    pub fn as_raw(&self) -> i32 {
        match self {
            Self::Everywhere => 0,
            Self::User(_) => 1,
            Self::Country(code) => pack_country(code),
        }
    }
}

/// Genres accepted by radio searches.
///
/// The discriminant is the bit index in the native mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioGenre {
    AltPopRock = 0,
    Blues = 1,
    Country = 2,
    Disco = 3,
    Funk = 4,
    HardRock = 5,
    HeavyMetal = 6,
    Rap = 7,
    House = 8,
    Jazz = 9,
    NewWave = 10,
    RnB = 11,
    Pop = 12,
    Punk = 13,
    Reggae = 14,
    PopRock = 15,
    Soul = 16,
    Techno = 17,
}

/// Fold a list of bit indices into a native mask.
pub(crate) fn bit_mask<T: Copy + Into<u32>>(items: &[T]) -> u32 {
    items.iter().fold(0u32, |mask, item| {
        let bit: u32 = (*item).into();
        mask | (1 << bit)
    })
}

impl From<RadioGenre> for u32 {
    fn from(genre: RadioGenre) -> Self {
        genre as u32
    }
}

impl From<ConnectionRule> for u32 {
    fn from(rule: ConnectionRule) -> Self {
        rule as u32
    }
}

/// Decode the packed two-character country code libspotify returns.
pub(crate) fn unpack_country(raw: i32) -> Option<String> {
    let hi = u8::try_from((raw >> 8) & 0xff).ok()?;
    let lo = u8::try_from(raw & 0xff).ok()?;
    if !(hi.is_ascii_alphabetic() && lo.is_ascii_alphabetic()) {
        return None;
    }
    Some([hi as char, lo as char].iter().collect())
}

pub(crate) fn pack_country(code: &str) -> i32 {
    code.bytes()
        .take(2)
        .fold(0, |packed, byte| (packed << 8) | i32::from(byte.to_ascii_uppercase()))
}
