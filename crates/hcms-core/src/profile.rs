//! Open profiles: the object model plus header and element access.
//!
//! A profile is its raw bytes. Header and element operations edit the owned
//! in-memory image through the codec in `icc`, and a read-write file
//! profile flushes that image back verbatim when closed. The backend keeps
//! its own parsed form alongside, used only for building transforms.

use std::fs::{File, OpenOptions};
use std::io::{Read as _, Seek, SeekFrom, Write as _};
use std::path::{Path, PathBuf};

use crate::backend::BackendProfile;
use crate::cms::{Cms, lock};
use crate::error::{Error, Result};
use crate::handle::ProfileHandle;
use crate::icc::header::{HEADER_LEN, ProfileHeader};
use crate::icc::tags::{self, ElementInfo};
use crate::icc::types::TagSignature;

/// Requested access to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

/// What to do about the underlying file when opening by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Open only if the file exists.
    #[default]
    OpenExisting,
    /// Open the file, creating it empty if missing.
    OpenAlways,
    /// Create the file, truncating any existing content first.
    CreateAlways,
    /// Create the file, failing if it already exists.
    CreateNew,
}

/// Where profile bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum ProfileSource<'a> {
    /// A file path. Relative paths resolve against the engine's color
    /// directory.
    File(&'a Path),
    /// An in-memory blob, copied on open. The disposition is accepted and
    /// ignored for memory sources.
    Memory(&'a [u8]),
}

enum Backing {
    Memory,
    File(File),
}

/// An open profile registered in the handle table.
pub(crate) struct Profile {
    backing: Backing,
    access: Access,
    data: Vec<u8>,
    engine: Box<dyn BackendProfile>,
}

impl Profile {
    /// Raw in-memory image. Always at least [`HEADER_LEN`] bytes.
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Backend-side profile object, for transform creation.
    pub(crate) fn engine(&self) -> &dyn BackendProfile {
        self.engine.as_ref()
    }

    /// Whether header and element writes are allowed.
    ///
    /// Access flags are not enforced for memory profiles: they are always
    /// mutable, a documented limitation callers have come to rely on.
    fn check_writable(&self) -> Result<()> {
        match self.backing {
            Backing::Memory => Ok(()),
            Backing::File(_) if self.access == Access::ReadWrite => Ok(()),
            Backing::File(_) => Err(Error::InvalidArgument(
                "profile was not opened read-write",
            )),
        }
    }

    /// Flush the in-memory image back over the underlying file.
    pub(crate) fn finish(&mut self) -> std::io::Result<()> {
        if self.access != Access::ReadWrite {
            return Ok(());
        }
        if let Backing::File(file) = &mut self.backing {
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&self.data)?;
        }
        Ok(())
    }
}

impl Cms {
    /// Open a profile and register it in the handle table.
    ///
    /// File sources are read whole into memory; the file handle stays open
    /// until [`close_profile`] so a read-write image can be flushed back.
    /// The backend gets the bytes last: a blob it rejects leaves nothing
    /// registered. File sharing modes are not modeled.
    ///
    /// [`close_profile`]: Cms::close_profile
    pub fn open_profile(
        &self,
        source: ProfileSource<'_>,
        access: Access,
        disposition: Disposition,
    ) -> Result<ProfileHandle> {
        let (backing, data) = match source {
            ProfileSource::Memory(blob) => (Backing::Memory, blob.to_vec()),
            ProfileSource::File(path) => {
                let path = self.resolve_profile_path(path);
                let mut file = open_profile_file(&path, access, disposition)?;
                let mut data = Vec::new();
                file.read_to_end(&mut data)?;
                (Backing::File(file), data)
            }
        };
        if data.len() < HEADER_LEN {
            return Err(Error::InvalidProfile(
                "profile shorter than the 128 byte header",
            ));
        }
        let engine = self
            .backend
            .open_profile(&data)
            .ok_or(Error::InvalidProfile("rejected by color engine"))?;
        let profile = Profile {
            backing,
            access,
            data,
            engine,
        };
        let handle = lock(&self.profiles).insert(profile);
        tracing::debug!(handle, "opened profile");
        Ok(ProfileHandle(handle))
    }

    /// Close `handle`, writing a read-write file profile back to disk.
    ///
    /// The whole file is overwritten with the in-memory image, not just
    /// modified tags. A failed write-back is returned as an error, but the
    /// handle is invalid either way; there is no undo of close.
    pub fn close_profile(&self, handle: ProfileHandle) -> Result<()> {
        let mut profiles = lock(&self.profiles);
        let mut profile = profiles
            .remove(handle.0)
            .ok_or(Error::InvalidHandle(handle.0))?;
        // Write-back runs with the table locked so a concurrent open of the
        // same file cannot observe a half-written image.
        let flushed = profile.finish();
        drop(profile);
        drop(profiles);
        tracing::debug!(handle = handle.0, "closed profile");
        if let Err(err) = flushed {
            tracing::warn!(handle = handle.0, error = %err, "profile write-back failed");
            return Err(Error::Io(err));
        }
        Ok(())
    }

    /// Decoded header of an open profile.
    pub fn profile_header(&self, handle: ProfileHandle) -> Result<ProfileHeader> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        ProfileHeader::decode(profile.data())
    }

    /// Overwrite the header of an open profile. Requires read-write access
    /// for file profiles.
    pub fn set_profile_header(&self, handle: ProfileHandle, header: &ProfileHeader) -> Result<()> {
        let mut profiles = lock(&self.profiles);
        let profile = self.grab_mut(&mut profiles, handle)?;
        profile.check_writable()?;
        profile.data[..HEADER_LEN].copy_from_slice(&header.encode());
        Ok(())
    }

    /// Number of entries in the profile's tag table.
    pub fn profile_element_count(&self, handle: ProfileHandle) -> Result<u32> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        Ok(tags::tag_count(profile.data()))
    }

    /// Signature of the tag table entry at `index` (1-based).
    pub fn profile_element_tag(&self, handle: ProfileHandle, index: u32) -> Result<TagSignature> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        Ok(tags::get_tag_entry(profile.data(), index)?.signature)
    }

    /// Whether the profile carries a tag with `signature`.
    pub fn has_profile_element(&self, handle: ProfileHandle, signature: TagSignature) -> Result<bool> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        match tags::find_tag(profile.data(), signature) {
            Ok(_) => Ok(true),
            Err(Error::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Read tag data starting `offset` bytes into the tag.
    ///
    /// Passing `None` for `out` is a size query: it fails with
    /// [`Error::InsufficientBuffer`] carrying the tag's full size so the
    /// caller can allocate and retry.
    pub fn profile_element(
        &self,
        handle: ProfileHandle,
        signature: TagSignature,
        offset: u32,
        out: Option<&mut [u8]>,
    ) -> Result<ElementInfo> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        tags::read_element(profile.data(), signature, offset, out)
    }

    /// Overwrite tag data in place and return the number of bytes copied.
    ///
    /// Writes clamp at the tag's recorded size; tags never grow and new
    /// tags cannot be added. Requires read-write access for file profiles.
    pub fn set_profile_element(
        &self,
        handle: ProfileHandle,
        signature: TagSignature,
        offset: u32,
        input: &[u8],
    ) -> Result<usize> {
        let mut profiles = lock(&self.profiles);
        let profile = self.grab_mut(&mut profiles, handle)?;
        profile.check_writable()?;
        tags::write_element(&mut profile.data, signature, offset, input)
    }

    /// Copy of the profile's full in-memory image.
    pub fn profile_data(&self, handle: ProfileHandle) -> Result<Vec<u8>> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        Ok(profile.data().to_vec())
    }

    /// Whether `handle` is live and its image carries the ICC file
    /// signature.
    pub fn is_valid_profile(&self, handle: ProfileHandle) -> Result<bool> {
        let profiles = lock(&self.profiles);
        let profile = self.grab(&profiles, handle)?;
        Ok(ProfileHeader::decode(profile.data())?.is_signed())
    }

    pub(crate) fn resolve_profile_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.color_directory().join(path)
        }
    }

    fn grab<'a>(
        &self,
        profiles: &'a crate::handle::HandleTable<Profile>,
        handle: ProfileHandle,
    ) -> Result<&'a Profile> {
        profiles.get(handle.0).ok_or(Error::InvalidHandle(handle.0))
    }

    fn grab_mut<'a>(
        &self,
        profiles: &'a mut crate::handle::HandleTable<Profile>,
        handle: ProfileHandle,
    ) -> Result<&'a mut Profile> {
        profiles
            .get_mut(handle.0)
            .ok_or(Error::InvalidHandle(handle.0))
    }
}

fn open_profile_file(path: &Path, access: Access, disposition: Disposition) -> Result<File> {
    if access == Access::Read && disposition != Disposition::OpenExisting {
        return Err(Error::InvalidArgument(
            "creating a profile file requires read-write access",
        ));
    }
    let mut options = OpenOptions::new();
    options.read(true);
    if access == Access::ReadWrite {
        options.write(true);
    }
    match disposition {
        Disposition::OpenExisting => {}
        Disposition::OpenAlways => {
            options.create(true);
        }
        Disposition::CreateAlways => {
            options.create(true).truncate(true);
        }
        Disposition::CreateNew => {
            options.create_new(true);
        }
    }
    Ok(options.open(path)?)
}
