//! Session configuration.
//!
//! Loaded from JSON (or built in code) and marshaled into the native
//! configuration record once, at session creation. The callback-dispatch
//! object is passed next to it to `Session::create`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::native::NativeConfig;
use crate::util::{path_to_cstring, to_cstring};

/// libspotify API version this crate is written against.
pub const API_VERSION: i32 = 9;

/// Application-supplied session settings.
///
/// # JSON Schema
///
/// ```json
/// {
///   "api_version": 9,
///   "cache_location": "/var/cache/player",
///   "settings_location": "/var/lib/player",
///   "application_key": [1, 2, 3],
///   "user_agent": "player/1.0",
///   "compress_playlists": false,
///   "dont_save_metadata_for_playlists": false,
///   "initially_unload_playlists": false,
///   "device_id": null,
///   "tracefile": null
/// }
/// ```
///
/// Every field except `application_key` has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_api_version")]
    pub api_version: i32,
    /// Where libspotify keeps its cache (may be shared with settings)
    #[serde(default = "default_cache_location")]
    pub cache_location: PathBuf,
    #[serde(default = "default_settings_location")]
    pub settings_location: PathBuf,
    /// Opaque application key blob issued by the service
    pub application_key: Vec<u8>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub compress_playlists: bool,
    #[serde(default)]
    pub dont_save_metadata_for_playlists: bool,
    #[serde(default)]
    pub initially_unload_playlists: bool,
    /// Stable device identifier for offline licensing
    #[serde(default)]
    pub device_id: Option<String>,
    /// File libspotify writes a trace log to
    #[serde(default)]
    pub tracefile: Option<PathBuf>,
}

fn default_api_version() -> i32 {
    API_VERSION
}

fn default_cache_location() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_settings_location() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_user_agent() -> String {
    concat!("spotify-ffi/", env!("CARGO_PKG_VERSION")).to_string()
}

impl SessionConfig {
    /// Configuration with defaults and the given application key.
    pub fn new(application_key: Vec<u8>) -> Self {
        Self {
            api_version: default_api_version(),
            cache_location: default_cache_location(),
            settings_location: default_settings_location(),
            application_key,
            user_agent: default_user_agent(),
            compress_playlists: false,
            dont_save_metadata_for_playlists: false,
            initially_unload_playlists: false,
            device_id: None,
            tracefile: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading session configuration");
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Replace the application key with the contents of a key file
    /// (the binary `appkey.key` distributed by the service).
    pub fn load_application_key(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.application_key = fs::read(path)?;
        Ok(())
    }

    pub fn with_locations(mut self, cache: impl Into<PathBuf>, settings: impl Into<PathBuf>) -> Self {
        self.cache_location = cache.into();
        self.settings_location = settings.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Marshal into the native record.
    pub(crate) fn to_native(&self) -> Result<NativeConfig> {
        Ok(NativeConfig {
            api_version: self.api_version,
            cache_location: path_to_cstring(&self.cache_location, "cache_location")?,
            settings_location: path_to_cstring(&self.settings_location, "settings_location")?,
            application_key: self.application_key.clone(),
            user_agent: to_cstring(&self.user_agent, "user_agent")?,
            compress_playlists: self.compress_playlists,
            dont_save_metadata_for_playlists: self.dont_save_metadata_for_playlists,
            initially_unload_playlists: self.initially_unload_playlists,
            device_id: self
                .device_id
                .as_deref()
                .map(|id| to_cstring(id, "device_id"))
                .transpose()?,
            tracefile: self
                .tracefile
                .as_deref()
                .map(|path| path_to_cstring(path, "tracefile"))
                .transpose()?,
        })
    }
}
