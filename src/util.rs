//! Argument and unit conversions at the native boundary.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Convert a Rust string to a C string for a native call.
///
/// Returns an error if the string contains an interior NUL byte.
pub fn to_cstring(s: &str, param: &'static str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::InvalidString { param })
}

/// Convert a path to a C string for a native call.
///
/// Returns an error if the path is not UTF-8 or contains a NUL byte.
pub fn path_to_cstring(path: &Path, param: &'static str) -> Result<CString> {
    let s = path.to_str().ok_or(Error::InvalidPath { param })?;
    to_cstring(s, param)
}

/// Copy a C string returned by the native library.
///
/// Returns `None` for a null pointer. Invalid UTF-8 is replaced rather than
/// rejected: names come from the service and are displayed as-is.
///
/// # Safety
///
/// The caller must ensure `ptr` is either null or points to a valid
/// null-terminated C string.
pub unsafe fn copy_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let cstr = unsafe { CStr::from_ptr(ptr) };
    Some(cstr.to_string_lossy().into_owned())
}

/// Native milliseconds to a `Duration`; negative values clamp to zero.
pub fn millis(ms: i32) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

/// `Duration` to native milliseconds, saturating.
pub fn to_millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

/// Native count to `usize`; negative values (errors) become zero.
pub fn count(n: i32) -> usize {
    usize::try_from(n).unwrap_or(0)
}
