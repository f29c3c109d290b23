//! Owned wrappers around reference-counted native objects.
//!
//! Every wrapper owns exactly one native reference, or holds the null
//! sentinel after it has been released. Release is explicit
//! ([`RawHandle::release`]) with `Drop` as the backstop; both go through the
//! same retire flag, so the native count is decremented exactly once.
//!
//! Native calls run under the read side of the handle's lock ([`Live`]).
//! Release takes the write side before taking the pointer out, so it waits
//! for calls already in flight and the native object is never freed under
//! one. Once a release has begun, new calls fail with `NullHandle`.
//!
//! # Identity
//!
//! Two wrappers are equal when both are live and wrap the same native object,
//! even if they were produced by different accessors. A released wrapper is
//! equal to nothing, itself included, so wrappers are `PartialEq` only. Use
//! [`HandleId`] as a map key.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::native::{Item, Library, NativePtr, Relation};
use crate::runtime;

/// The kinds of native object this crate wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Session,
    Track,
    Album,
    Artist,
    AlbumBrowse,
    ArtistBrowse,
    ToplistBrowse,
    Search,
    Link,
    Image,
    User,
    Playlist,
    PlaylistContainer,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Session => "session",
            Kind::Track => "track",
            Kind::Album => "album",
            Kind::Artist => "artist",
            Kind::AlbumBrowse => "albumbrowse",
            Kind::ArtistBrowse => "artistbrowse",
            Kind::ToplistBrowse => "toplistbrowse",
            Kind::Search => "search",
            Kind::Link => "link",
            Kind::Image => "image",
            Kind::User => "user",
            Kind::Playlist => "playlist",
            Kind::PlaylistContainer => "playlistcontainer",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hashable identity of a live native object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    pub kind: Kind,
    pub addr: usize,
}

/// One native reference plus its release state.
pub(crate) struct RawHandle {
    kind: Kind,
    ptr: RwLock<Option<NativePtr>>,
    retired: AtomicBool,
    library: Arc<dyn Library>,
}

/// The native pointer, held live for as long as the guard exists.
///
/// A release on another thread waits until every `Live` of its handle is
/// dropped. Releasing the same handle while holding one deadlocks.
pub(crate) struct Live<'a> {
    _guard: RwLockReadGuard<'a, Option<NativePtr>>,
    ptr: NativePtr,
}

impl Deref for Live<'_> {
    type Target = NativePtr;

    fn deref(&self) -> &NativePtr {
        &self.ptr
    }
}

impl fmt::Debug for Live<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.ptr, f)
    }
}

impl RawHandle {
    /// A handle holding the null sentinel.
    pub(crate) fn null(kind: Kind, library: Arc<dyn Library>) -> Self {
        Self {
            kind,
            ptr: RwLock::new(None),
            retired: AtomicBool::new(false),
            library,
        }
    }

    /// Take over a reference the caller already owns (constructors).
    pub(crate) fn wrap(kind: Kind, library: Arc<dyn Library>, ptr: NativePtr) -> Self {
        debug!(%kind, ?ptr, "wrapping native object");
        Self {
            kind,
            ptr: RwLock::new(Some(ptr)),
            retired: AtomicBool::new(false),
            library,
        }
    }

    /// Take a new reference on a borrowed pointer (accessors).
    pub(crate) fn wrap_borrowed(kind: Kind, library: Arc<dyn Library>, ptr: NativePtr) -> Self {
        library.add_ref(kind, ptr);
        Self::wrap(kind, library, ptr)
    }

    /// Store the pointer produced by a constructor into a null handle.
    ///
    /// Used when the handle has to exist before the native object does.
    pub(crate) fn install(&self, ptr: NativePtr) {
        let previous = self.ptr.write().replace(ptr);
        if let Some(previous) = previous {
            error!(kind = %self.kind, ?previous, "installed over a live handle; releasing the old object");
            self.library.release(self.kind, previous);
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn library(&self) -> &Arc<dyn Library> {
        &self.library
    }

    /// Dereference, failing with [`Error::NullHandle`] on the null sentinel
    /// or once a release has begun.
    ///
    /// Reads are recursive: a callback may use a handle its caller holds.
    pub(crate) fn get(&self) -> Result<Live<'_>> {
        let null = Error::NullHandle { kind: self.kind };
        if self.retired.load(Ordering::Acquire) {
            return Err(null);
        }
        let guard = self.ptr.read_recursive();
        match *guard {
            Some(ptr) => Ok(Live { _guard: guard, ptr }),
            None => Err(null),
        }
    }

    /// Run `f` against the live native object.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&dyn Library, NativePtr) -> R) -> Result<R> {
        let ptr = self.get()?;
        Ok(f(self.library.as_ref(), *ptr))
    }

    /// Give the reference back. Returns whether anything was released.
    pub(crate) fn release(&self) -> bool {
        self.retire() && self.reclaim()
    }

    /// Refuse new calls. Returns true for the one caller that retired the
    /// handle; that caller must follow up with [`RawHandle::reclaim`].
    pub(crate) fn retire(&self) -> bool {
        !self.retired.swap(true, Ordering::AcqRel)
    }

    /// Wait for calls in flight, then release the native object.
    ///
    /// The runtime is given up while waiting: a call in flight may be a
    /// callback that needs it.
    pub(crate) fn reclaim(&self) -> bool {
        let mut slot = match self.ptr.try_write() {
            Some(slot) => slot,
            None => runtime::blocking(|| self.ptr.write()),
        };
        let previous = slot.take();
        drop(slot);
        match previous {
            Some(ptr) => {
                debug!(kind = %self.kind, ?ptr, "releasing native object");
                self.library.release(self.kind, ptr);
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        self.retired.load(Ordering::Acquire) || self.ptr.read_recursive().is_none()
    }

    pub(crate) fn id(&self) -> Option<HandleId> {
        self.get().ok().map(|ptr| HandleId {
            kind: self.kind,
            addr: ptr.addr(),
        })
    }

    /// The pointer without holding it live.
    #[cfg(test)]
    pub(crate) fn peek(&self) -> Option<NativePtr> {
        *self.ptr.read_recursive()
    }

    pub(crate) fn is_loaded(&self) -> Result<bool> {
        self.with(|lib, ptr| lib.is_loaded(self.kind, ptr))
    }

    pub(crate) fn count(&self, item: Item) -> Result<usize> {
        self.with(|lib, ptr| lib.count(self.kind, ptr, item))
            .map(|n| usize::try_from(n).unwrap_or(0))
    }

    /// Wrap the `index`th child, taking a reference on it.
    pub(crate) fn item<T: Wrapper>(&self, item: Item, index: usize) -> Result<Option<T>> {
        let ptr = self.get()?;
        let Ok(index) = i32::try_from(index) else {
            return Ok(None);
        };
        Ok(self
            .library
            .item(self.kind, *ptr, item, index)
            .map(|child| T::from_raw(Self::wrap_borrowed(T::KIND, self.library.clone(), child))))
    }

    /// Wrap a single related object, taking a reference on it.
    pub(crate) fn related<T: Wrapper>(&self, relation: Relation) -> Result<Option<T>> {
        let ptr = self.get()?;
        Ok(self
            .library
            .related(self.kind, *ptr, relation)
            .map(|other| T::from_raw(Self::wrap_borrowed(T::KIND, self.library.clone(), other))))
    }
}

impl Clone for RawHandle {
    /// A clone owns its own reference; cloning a released handle gives
    /// another released handle.
    fn clone(&self) -> Self {
        match self.get() {
            Ok(ptr) => Self::wrap_borrowed(self.kind, self.library.clone(), *ptr),
            Err(_) => Self::null(self.kind, self.library.clone()),
        }
    }
}

impl PartialEq for RawHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(ptr) => write!(f, "{}({:#x})", self.kind, ptr.addr()),
            Err(_) => write!(f, "{}(released)", self.kind),
        }
    }
}

impl Drop for RawHandle {
    fn drop(&mut self) {
        if self.release() {
            debug!(kind = %self.kind, "released by finalizer");
        }
    }
}

/// Typed wrappers built on [`RawHandle`].
pub(crate) trait Wrapper: Sized {
    const KIND: Kind;

    fn from_raw(raw: RawHandle) -> Self;

    /// Wrap a fresh reference returned by a native constructor.
    fn from_owned(library: Arc<dyn Library>, ptr: NativePtr) -> Self {
        Self::from_raw(RawHandle::wrap(Self::KIND, library, ptr))
    }
}

/// Define a typed handle for a leaf native object.
macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq)]
        pub struct $name {
            raw: $crate::handle::RawHandle,
        }

        impl $crate::handle::Wrapper for $name {
            const KIND: $crate::handle::Kind = $crate::handle::Kind::$kind;

            fn from_raw(raw: $crate::handle::RawHandle) -> Self {
                Self { raw }
            }
        }

        impl $name {
            /// Give the native reference back.
            ///
            /// Every later accessor fails with `Error::NullHandle`. Releasing
            /// twice is a no-op.
            pub fn release(&self) {
                self.raw.release();
            }

            pub fn is_released(&self) -> bool {
                self.raw.is_null()
            }

            /// Identity of the wrapped object, `None` once released.
            pub fn id(&self) -> Option<$crate::handle::HandleId> {
                self.raw.id()
            }

            #[allow(dead_code)]
            pub(crate) fn raw(&self) -> &$crate::handle::RawHandle {
                &self.raw
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.raw, f)
            }
        }
    };
}

pub(crate) use native_handle;
