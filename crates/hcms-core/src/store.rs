//! Installed-profile management.
//!
//! Covers the color directory: enumeration with header criteria, install
//! and uninstall, and the persistent device association records used to
//! answer "which profiles belong to this printer". Associations live in a
//! JSON file beside the profiles, keyed by device class code and profile
//! basename.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{File, OpenOptions};
use std::io::Read as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cms::{Cms, lock};
use crate::error::{Error, Result};
use crate::icc::header::{HEADER_LEN, ProfileHeader};
use crate::icc::types::fourcc_string;
use crate::profile::{Access, Disposition, ProfileSource};

/// Header criteria for [`Cms::enumerate_profiles`].
///
/// A profile is listed only when every present field equals its header
/// counterpart. `device_name` is resolved through the association store
/// rather than the header.
#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub cmm_type: Option<u32>,
    pub device_class: Option<u32>,
    pub color_space: Option<u32>,
    pub pcs: Option<u32>,
    pub signature: Option<u32>,
    pub platform: Option<u32>,
    pub flags: Option<u32>,
    pub manufacturer: Option<u32>,
    pub model: Option<u32>,
    pub attributes: Option<[u32; 2]>,
    pub rendering_intent: Option<u32>,
    pub creator: Option<u32>,
    /// Restrict to profiles associated with this device.
    pub device_name: Option<String>,
    /// Carried by the classic enumeration interfaces but never backed by
    /// any header field; rejected here instead of silently ignored.
    pub media_type: Option<u32>,
    /// See [`ProfileFilter::media_type`].
    pub dither_mode: Option<u32>,
    /// See [`ProfileFilter::media_type`].
    pub resolution: Option<[u32; 2]>,
}

const STORE_FILE: &str = "device-associations.json";

/// Device association records, persisted as JSON in the color directory.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AssociationStore {
    /// device class code -> profile basename -> associated device names
    classes: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl AssociationStore {
    fn load(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return Self::default(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "unreadable association store, starting empty",
                );
                Self::default()
            }
        }
    }

    fn save(&self, dir: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|err| Error::Io(std::io::Error::other(err)))?;
        std::fs::write(dir.join(STORE_FILE), bytes)?;
        Ok(())
    }

    fn associate(&mut self, class: u32, basename: &str, device: &str) {
        self.classes
            .entry(fourcc_string(class))
            .or_default()
            .entry(basename.to_string())
            .or_default()
            .insert(device.to_string());
    }

    /// Remove one association, dropping emptied keys. False when it was
    /// not recorded.
    fn disassociate(&mut self, class: u32, basename: &str, device: &str) -> bool {
        let class_key = fourcc_string(class);
        let Some(profiles) = self.classes.get_mut(&class_key) else {
            return false;
        };
        let Some(devices) = profiles.get_mut(basename) else {
            return false;
        };
        let removed = devices.remove(device);
        if devices.is_empty() {
            profiles.remove(basename);
        }
        if profiles.is_empty() {
            self.classes.remove(&class_key);
        }
        removed
    }

    fn is_associated(&self, class: u32, basename: &str, device: &str) -> bool {
        self.classes
            .get(&fourcc_string(class))
            .and_then(|profiles| profiles.get(basename))
            .is_some_and(|devices| devices.contains(device))
    }
}

impl Cms {
    /// List installed profile filenames matching `filter`, sorted.
    ///
    /// Scans the color directory for `.icc`/`.icm` files and reads just the
    /// 128-byte header of each. Files too short, unreadable, or without the
    /// ICC file signature are skipped. An empty result is not an error.
    ///
    /// Media type, dither mode, and resolution criteria fail with
    /// [`Error::NotSupported`]: headers carry no such fields, and accepting
    /// the criteria while ignoring them would silently widen the result.
    pub fn enumerate_profiles(&self, filter: &ProfileFilter) -> Result<Vec<String>> {
        if filter.media_type.is_some()
            || filter.dither_mode.is_some()
            || filter.resolution.is_some()
        {
            return Err(Error::NotSupported(
                "media type, dither mode, and resolution criteria",
            ));
        }
        let store = filter.device_name.as_deref().map(|_| {
            let _guard = lock(&self.associations);
            AssociationStore::load(self.color_directory())
        });

        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.color_directory())? {
            let path = entry?.path();
            if !has_profile_extension(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(header) = read_file_header(&path) else {
                continue;
            };
            if !header.is_signed() || !filter_matches(filter, &header) {
                continue;
            }
            if let (Some(store), Some(device)) = (&store, filter.device_name.as_deref()) {
                if !store.is_associated(header.device_class, name, device) {
                    continue;
                }
            }
            names.push(name.to_string());
        }
        names.sort();
        Ok(names)
    }

    /// Copy `source` into the color directory.
    ///
    /// The file is not validated as a profile first. Installing a path that
    /// already resolves to its own install location is a no-op success; a
    /// different file already installed under the same name is never
    /// overwritten.
    pub fn install_profile(&self, source: &Path) -> Result<()> {
        let file_name = source
            .file_name()
            .ok_or(Error::InvalidArgument("profile path has no file name"))?;
        let dest = self.color_directory().join(file_name);
        if same_file(source, &dest) {
            return Ok(());
        }
        let mut reader = File::open(source)?;
        let mut writer = OpenOptions::new().write(true).create_new(true).open(&dest)?;
        std::io::copy(&mut reader, &mut writer)?;
        tracing::debug!(source = %source.display(), dest = %dest.display(), "installed profile");
        Ok(())
    }

    /// Remove an installed profile's file when `delete` is set; otherwise a
    /// no-op kept for symmetry with [`Cms::install_profile`].
    pub fn uninstall_profile(&self, profile: &Path, delete: bool) -> Result<()> {
        if delete {
            std::fs::remove_file(self.resolve_profile_path(profile))?;
        }
        Ok(())
    }

    /// Record that `device` uses `profile`.
    ///
    /// The profile is opened read-only first to take its device class from
    /// the header, so a path that does not name a usable profile fails
    /// before any persistent state changes.
    pub fn associate_profile_with_device(&self, profile: &Path, device: &str) -> Result<()> {
        let (class, basename) = self.association_key(profile)?;
        let _guard = lock(&self.associations);
        let mut store = AssociationStore::load(self.color_directory());
        store.associate(class, &basename, device);
        store.save(self.color_directory())?;
        tracing::debug!(device, profile = %basename, "associated profile with device");
        Ok(())
    }

    /// Remove the association between `device` and `profile`. Fails with
    /// [`Error::NotFound`] when no such association is recorded.
    pub fn disassociate_profile_from_device(&self, profile: &Path, device: &str) -> Result<()> {
        let (class, basename) = self.association_key(profile)?;
        let _guard = lock(&self.associations);
        let mut store = AssociationStore::load(self.color_directory());
        if !store.disassociate(class, &basename, device) {
            return Err(Error::NotFound);
        }
        store.save(self.color_directory())?;
        tracing::debug!(device, profile = %basename, "removed device association");
        Ok(())
    }

    fn association_key(&self, profile: &Path) -> Result<(u32, String)> {
        let handle = self.open_profile(
            ProfileSource::File(profile),
            Access::Read,
            Disposition::OpenExisting,
        )?;
        let header = self.profile_header(handle);
        self.close_profile(handle)?;
        let basename = profile
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(Error::InvalidArgument("profile path has no file name"))?;
        Ok((header?.device_class, basename.to_string()))
    }
}

fn has_profile_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("icc") || ext.eq_ignore_ascii_case("icm"))
}

fn read_file_header(path: &Path) -> Option<ProfileHeader> {
    let mut file = File::open(path).ok()?;
    let mut bytes = [0u8; HEADER_LEN];
    file.read_exact(&mut bytes).ok()?;
    ProfileHeader::decode(&bytes).ok()
}

fn filter_matches(filter: &ProfileFilter, header: &ProfileHeader) -> bool {
    fn field<T: PartialEq + Copy>(want: Option<T>, got: T) -> bool {
        want.is_none_or(|want| want == got)
    }
    field(filter.cmm_type, header.cmm_type)
        && field(filter.device_class, header.device_class)
        && field(filter.color_space, header.color_space)
        && field(filter.pcs, header.pcs)
        && field(filter.signature, header.signature)
        && field(filter.platform, header.platform)
        && field(filter.flags, header.flags)
        && field(filter.manufacturer, header.manufacturer)
        && field(filter.model, header.model)
        && field(filter.attributes, header.attributes)
        && field(filter.rendering_intent, header.rendering_intent)
        && field(filter.creator, header.creator)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
