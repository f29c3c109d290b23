// Build script for spotify-ffi
//
// libspotify is only linked when the `libspotify` feature is enabled; the
// default build (and the test-suite) runs against the in-crate test double.
//
// Set LIBSPOTIFY_LIB_DIR when the library is not on the default search path.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-env-changed=LIBSPOTIFY_LIB_DIR");

    if env::var_os("CARGO_FEATURE_LIBSPOTIFY").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("LIBSPOTIFY_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
    println!("cargo:rustc-link-lib=dylib=spotify");
}
