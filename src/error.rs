//! Error handling for the binding layer.
//!
//! Two channels exist and never overlap: native failures reported by
//! libspotify as an [`ErrorCode`], and operations attempted on a handle that
//! has already been released ([`Error::NullHandle`]), which are rejected
//! before the native library is reached.
//!
//! Host memory exhaustion is not represented here: the global allocator
//! aborts the process, which is the only safe outcome once the native library
//! may hold the last reference to a half-registered object.

use std::fmt;

use thiserror::Error;

use crate::handle::Kind;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes reported by libspotify (`sp_error`).
///
/// The numeric values are the native ones and are stable.
/// Codes this crate does not know are preserved in [`ErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// No error
    Ok,

    // Session and API errors (1-12)
    /// The library version targeted does not match the one you claim you support
    BadApiVersion,
    /// Initialization of library failed, are cache locations etc. valid?
    ApiInitializationFailed,
    /// The track specified for playing cannot be played
    TrackNotPlayable,
    /// The application key is invalid
    BadApplicationKey,
    /// Login failed because of bad username and/or password
    BadUsernameOrPassword,
    /// The specified username is banned
    UserBanned,
    /// Cannot connect to the Spotify backend system
    UnableToContactServer,
    /// Client is too old, library will need to be updated
    ClientTooOld,
    /// Some other error occurred, and it is permanent (e.g. trying to relogin will not help)
    OtherPermanent,
    /// The user agent string is invalid or too long
    BadUserAgent,
    /// No valid callback registered to handle events
    MissingCallback,

    // Request errors (13-27)
    /// Input data was either missing or invalid
    InvalidIndata,
    /// Index out of range
    IndexOutOfRange,
    /// The specified user needs a premium account
    UserNeedsPremium,
    /// A transient error occurred
    OtherTransient,
    /// The resource is currently loading
    IsLoading,
    /// Could not find any suitable stream to play
    NoStreamAvailable,
    /// Requested operation is not allowed
    PermissionDenied,
    /// Target inbox is full
    InboxIsFull,
    /// Cache is not enabled
    NoCache,
    /// Requested user does not exist
    NoSuchUser,
    /// No credentials are stored
    NoCredentials,
    /// Network disabled
    NetworkDisabled,
    /// Invalid device ID
    InvalidDeviceId,
    /// Unable to open trace file
    CantOpenTraceFile,
    /// This application is no longer allowed to use the Spotify service
    ApplicationBanned,

    // Offline sync errors (31-36)
    /// Reached the device limit for number of tracks to download
    OfflineTooManyTracks,
    /// Disk cache is full so no more tracks can be downloaded to offline mode
    OfflineDiskCache,
    /// Offline key has expired, the user must go online again
    OfflineExpired,
    /// This user is not allowed to use offline mode
    OfflineNotAllowed,
    /// The license for this device has been lost
    OfflineLicenseLost,
    /// The Spotify license server does not respond correctly
    OfflineLicenseError,

    // Miscellaneous (39-41)
    /// A Last.fm scrobble authentication error has occurred
    LastfmAuthError,
    /// An invalid argument was specified
    InvalidArgument,
    /// An operating system error
    SystemFailure,

    /// A code this crate does not know about
    Other(i32),
}

impl ErrorCode {
    /// Convert a raw native code.
    pub fn from_raw(code: i32) -> Self {
        use ErrorCode::*;

        match code {
            0 => Ok,
            1 => BadApiVersion,
            2 => ApiInitializationFailed,
            3 => TrackNotPlayable,
            5 => BadApplicationKey,
            6 => BadUsernameOrPassword,
            7 => UserBanned,
            8 => UnableToContactServer,
            9 => ClientTooOld,
            10 => OtherPermanent,
            11 => BadUserAgent,
            12 => MissingCallback,
            13 => InvalidIndata,
            14 => IndexOutOfRange,
            15 => UserNeedsPremium,
            16 => OtherTransient,
            17 => IsLoading,
            18 => NoStreamAvailable,
            19 => PermissionDenied,
            20 => InboxIsFull,
            21 => NoCache,
            22 => NoSuchUser,
            23 => NoCredentials,
            24 => NetworkDisabled,
            25 => InvalidDeviceId,
            26 => CantOpenTraceFile,
            27 => ApplicationBanned,
            31 => OfflineTooManyTracks,
            32 => OfflineDiskCache,
            33 => OfflineExpired,
            34 => OfflineNotAllowed,
            35 => OfflineLicenseLost,
            36 => OfflineLicenseError,
            39 => LastfmAuthError,
            40 => InvalidArgument,
            41 => SystemFailure,
            other => Other(other),
        }
    }

    /// The raw native code.
    pub fn as_raw(self) -> i32 {
        use ErrorCode::*;

        match self {
            Ok => 0,
            BadApiVersion => 1,
            ApiInitializationFailed => 2,
            TrackNotPlayable => 3,
            BadApplicationKey => 5,
            BadUsernameOrPassword => 6,
            UserBanned => 7,
            UnableToContactServer => 8,
            ClientTooOld => 9,
            OtherPermanent => 10,
            BadUserAgent => 11,
            MissingCallback => 12,
            InvalidIndata => 13,
            IndexOutOfRange => 14,
            UserNeedsPremium => 15,
            OtherTransient => 16,
            IsLoading => 17,
            NoStreamAvailable => 18,
            PermissionDenied => 19,
            InboxIsFull => 20,
            NoCache => 21,
            NoSuchUser => 22,
            NoCredentials => 23,
            NetworkDisabled => 24,
            InvalidDeviceId => 25,
            CantOpenTraceFile => 26,
            ApplicationBanned => 27,
            OfflineTooManyTracks => 31,
            OfflineDiskCache => 32,
            OfflineExpired => 33,
            OfflineNotAllowed => 34,
            OfflineLicenseLost => 35,
            OfflineLicenseError => 36,
            LastfmAuthError => 39,
            InvalidArgument => 40,
            SystemFailure => 41,
            Other(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == ErrorCode::Ok
    }

    /// Turn a non-success code into [`Error::Native`] tagged with `operation`.
    pub fn check(self, operation: &'static str) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Native {
                operation,
                code: self,
            })
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Other(code) => write!(f, "unknown error code {code}"),
            known => write!(f, "{known:?} ({})", known.as_raw()),
        }
    }
}

/// Errors returned by the safe binding.
#[derive(Debug, Error)]
pub enum Error {
    /// The handle was released (or never initialized).
    #[error("{kind} handle is null or already released")]
    NullHandle { kind: Kind },

    /// libspotify reported a failure.
    ///
    /// Use `Session::error_message` to render the code.
    #[error("{operation} failed: {code}")]
    Native {
        operation: &'static str,
        code: ErrorCode,
    },

    /// A native constructor returned no object and no error code.
    #[error("{operation} returned no object")]
    NativeNull { operation: &'static str },

    /// A string argument contains an interior NUL byte.
    #[error("string argument `{param}` contains an interior NUL byte")]
    InvalidString { param: &'static str },

    /// A path argument is not valid UTF-8.
    #[error("path argument `{param}` is not valid UTF-8")]
    InvalidPath { param: &'static str },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error while loading configuration or the application key.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The native code, when this is a native failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Native { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_null_handle(&self) -> bool {
        matches!(self, Error::NullHandle { .. })
    }
}
