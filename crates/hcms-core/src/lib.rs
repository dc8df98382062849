//! # hcms-core - handle-based color management engine
//!
//! An ICC color management engine in the style of the classic platform CMS
//! interfaces: profiles and transforms are opened into opaque handles owned
//! by an engine context, profile bytes are read and edited in place through
//! a bit-exact codec, and the numeric color science is delegated to a
//! pluggable backend.
//!
//! ## Layers
//!
//! - **Codec** ([`icc`]): the 128-byte big-endian header and the tag table,
//!   operating on plain byte slices and round-tripping unknown fields.
//! - **Profile manager** ([`Cms`] profile operations): open from file or
//!   memory, header/element access, write-back on close, install and
//!   enumerate under a color directory, device association.
//! - **Transform engine** ([`Cms`] transform operations): link profiles
//!   under a rendering intent, convert bitmaps and color arrays.
//! - **Backend seam** ([`backend`]): the trait an actual color math
//!   library implements. `hcms-lcms2` provides one over Little CMS.
//!
//! ## Quick start
//!
//! ```no_run
//! use hcms_core::{Access, Cms, Disposition, ProfileSource, TagSignature};
//!
//! fn inspect(cms: &Cms, blob: &[u8]) -> hcms_core::Result<()> {
//!     let profile = cms.open_profile(
//!         ProfileSource::Memory(blob),
//!         Access::Read,
//!         Disposition::OpenExisting,
//!     )?;
//!     let header = cms.profile_header(profile)?;
//!     println!("device class {:08x}", header.device_class);
//!     if cms.has_profile_element(profile, TagSignature::COPYRIGHT)? {
//!         println!("profile carries a copyright tag");
//!     }
//!     cms.close_profile(profile)
//! }
//! ```

pub mod backend;
mod cms;
pub mod error;
mod formats;
mod handle;
pub mod icc;
mod profile;
mod store;
mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendProfile, BackendTransform, ColorBackend, RenderingIntent};
pub use cms::{Cms, default_color_directory};
pub use error::{Error, Result};
pub use formats::{BitmapFormat, Color, ColorType, PixelLayout};
pub use handle::{ProfileHandle, TransformHandle};
pub use icc::{ElementInfo, ProfileHeader, TagSignature};
pub use profile::{Access, Disposition, ProfileSource};
pub use store::ProfileFilter;

/// Version of hcms-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
