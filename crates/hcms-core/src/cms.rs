//! Engine context.
//!
//! All state lives in a [`Cms`] value: the color backend, the color
//! directory, and the handle tables for open profiles and transforms. There
//! is no global instance; embedders create as many independent contexts as
//! they need and may share one across threads.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::ColorBackend;
use crate::formats::{BitmapFormat, ColorType};
use crate::handle::HandleTable;
use crate::profile::Profile;
use crate::transform::Transform;

/// A color management engine instance.
///
/// Operations are grouped in three layers: profile access (open, header and
/// element reads and writes, close), profile management (install, enumerate,
/// device association), and transforms (create, translate, close). Both
/// handle tables sit behind their own mutex; the few paths that need both
/// take the profile table first. A third mutex serializes loads and
/// rewrites of the on-disk association store.
pub struct Cms {
    pub(crate) backend: Box<dyn ColorBackend>,
    color_dir: PathBuf,
    pub(crate) profiles: Mutex<HandleTable<Profile>>,
    pub(crate) transforms: Mutex<HandleTable<Transform>>,
    pub(crate) associations: Mutex<()>,
    warned: Mutex<WarnedFormats>,
}

#[derive(Default)]
struct WarnedFormats {
    bitmap: BTreeSet<BitmapFormat>,
    color: BTreeSet<ColorType>,
}

impl Cms {
    /// Create an engine over `backend` with the platform's standard color
    /// directory.
    pub fn new(backend: impl ColorBackend + 'static) -> Self {
        Self::with_color_directory(backend, default_color_directory())
    }

    /// Create an engine that installs, enumerates, and resolves relative
    /// profile paths under `color_dir`.
    pub fn with_color_directory(
        backend: impl ColorBackend + 'static,
        color_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend: Box::new(backend),
            color_dir: color_dir.into(),
            profiles: Mutex::new(HandleTable::new()),
            transforms: Mutex::new(HandleTable::new()),
            associations: Mutex::new(()),
            warned: Mutex::new(WarnedFormats::default()),
        }
    }

    /// Directory holding installed profiles.
    pub fn color_directory(&self) -> &Path {
        &self.color_dir
    }

    /// Log the first time each unmapped bitmap format is substituted.
    pub(crate) fn note_unmapped_bitmap(&self, format: BitmapFormat) {
        if lock(&self.warned).bitmap.insert(format) {
            tracing::warn!(?format, "unhandled bitmap format, converting as packed RGB 8");
        }
    }

    /// Log the first time each unmapped color type is substituted.
    pub(crate) fn note_unmapped_color(&self, ty: ColorType) {
        if lock(&self.warned).color.insert(ty) {
            tracing::warn!(?ty, "unhandled color type, converting as RGB 16");
        }
    }
}

/// Lock a mutex, recovering the data if a panicking thread poisoned it.
/// Table state stays consistent under panic because every mutation either
/// completes or leaves the slot untouched.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The platform's standard directory for installed ICC profiles.
pub fn default_color_directory() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        PathBuf::from(r"C:\Windows\System32\spool\drivers\color")
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/ColorSync/Profiles")
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        PathBuf::from("/usr/share/color/icc")
    }
}
