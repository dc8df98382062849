//! Test support: a predictable backend and canned profile blobs.

use std::sync::{Arc, Mutex};

use crate::Cms;
use crate::backend::{BackendProfile, BackendTransform, ColorBackend, RenderingIntent};
use crate::formats::PixelLayout;
use crate::icc::header::{HEADER_LEN, PROFILE_SIGNATURE, ProfileHeader};
use crate::icc::tags::{TAG_ENTRY_LEN, TAG_TABLE_OFFSET};
use crate::icc::types::{S15Fixed16, TagSignature, XyzNumber, class, space};

/// Backend that checks the file signature on open and copies pixel bytes
/// through unchanged, recording every call so tests can assert on how the
/// engine drove it.
#[derive(Debug, Default, Clone)]
pub(crate) struct PassthroughBackend {
    pub calls: Arc<Mutex<CallLog>>,
}

#[derive(Debug, Default)]
pub(crate) struct CallLog {
    /// Layout pairs passed to `set_layouts`, in order.
    pub layouts: Vec<(PixelLayout, PixelLayout)>,
    /// Intent of each created transform.
    pub intents: Vec<RenderingIntent>,
    /// Pixel count of each `run` call.
    pub runs: Vec<usize>,
}

struct PassthroughProfile;

impl BackendProfile for PassthroughProfile {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct PassthroughTransform {
    calls: Arc<Mutex<CallLog>>,
    layouts: (PixelLayout, PixelLayout),
}

impl BackendTransform for PassthroughTransform {
    fn set_layouts(&mut self, input: PixelLayout, output: PixelLayout) -> bool {
        self.calls.lock().unwrap().layouts.push((input, output));
        self.layouts = (input, output);
        true
    }

    fn run(&mut self, src: &[u8], dst: &mut [u8], pixels: usize) -> bool {
        let in_bpp = self.layouts.0.bytes_per_pixel();
        let out_bpp = self.layouts.1.bytes_per_pixel();
        if src.len() != pixels * in_bpp || dst.len() != pixels * out_bpp {
            return false;
        }
        self.calls.lock().unwrap().runs.push(pixels);
        if in_bpp == out_bpp {
            dst.copy_from_slice(src);
        } else {
            let shared = in_bpp.min(out_bpp);
            for (s, d) in src.chunks_exact(in_bpp).zip(dst.chunks_exact_mut(out_bpp)) {
                d.fill(0);
                d[..shared].copy_from_slice(&s[..shared]);
            }
        }
        true
    }
}

impl ColorBackend for PassthroughBackend {
    fn open_profile(&self, data: &[u8]) -> Option<Box<dyn BackendProfile>> {
        if data.len() < HEADER_LEN {
            return None;
        }
        let signature = u32::from_be_bytes([data[36], data[37], data[38], data[39]]);
        if signature != PROFILE_SIGNATURE {
            return None;
        }
        Some(Box::new(PassthroughProfile))
    }

    fn create_transform(
        &self,
        _input: &dyn BackendProfile,
        _output: &dyn BackendProfile,
        _target: Option<&dyn BackendProfile>,
        intent: RenderingIntent,
    ) -> Option<Box<dyn BackendTransform>> {
        self.calls.lock().unwrap().intents.push(intent);
        Some(Box::new(PassthroughTransform {
            calls: self.calls.clone(),
            layouts: (PixelLayout::Rgb8, PixelLayout::Rgb8),
        }))
    }

    fn create_multi_transform(
        &self,
        _profiles: &[&dyn BackendProfile],
        intent: RenderingIntent,
    ) -> Option<Box<dyn BackendTransform>> {
        self.calls.lock().unwrap().intents.push(intent);
        Some(Box::new(PassthroughTransform {
            calls: self.calls.clone(),
            layouts: (PixelLayout::Rgb8, PixelLayout::Rgb8),
        }))
    }
}

/// Engine over a passthrough backend and a fresh temporary color directory.
pub(crate) fn test_cms() -> (Cms, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let cms = Cms::with_color_directory(PassthroughBackend::default(), dir.path());
    (cms, dir)
}

/// Like [`test_cms`], also handing back the backend call log.
pub(crate) fn test_cms_logged() -> (Cms, Arc<Mutex<CallLog>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let backend = PassthroughBackend::default();
    let calls = backend.calls.clone();
    let cms = Cms::with_color_directory(backend, dir.path());
    (cms, calls, dir)
}

/// Smallest useful profile: display class, RGB data space, XYZ connection
/// space, and a single 16-byte copyright tag.
pub(crate) fn sample_profile() -> Vec<u8> {
    sample_profile_with(|_| {})
}

/// [`sample_profile`] with the header adjusted before encoding.
pub(crate) fn sample_profile_with(edit: impl FnOnce(&mut ProfileHeader)) -> Vec<u8> {
    const TEXT: &[u8; 16] = b"(c) test profile";
    let tag_offset = (TAG_TABLE_OFFSET + TAG_ENTRY_LEN) as u32;
    let total = tag_offset as usize + TEXT.len();

    let mut header = ProfileHeader {
        size: total as u32,
        version: 0x0430_0000,
        device_class: class::DISPLAY,
        color_space: space::RGB,
        pcs: space::XYZ,
        signature: PROFILE_SIGNATURE,
        illuminant: XyzNumber {
            x: S15Fixed16::from_raw(0xf6d6),
            y: S15Fixed16::from_raw(0x1_0000),
            z: S15Fixed16::from_raw(0xd32d),
        },
        ..ProfileHeader::default()
    };
    edit(&mut header);

    let mut data = vec![0u8; total];
    data[..HEADER_LEN].copy_from_slice(&header.encode());
    data[128..132].copy_from_slice(&1u32.to_be_bytes());
    data[132..136].copy_from_slice(&TagSignature::COPYRIGHT.0.to_be_bytes());
    data[136..140].copy_from_slice(&tag_offset.to_be_bytes());
    data[140..144].copy_from_slice(&(TEXT.len() as u32).to_be_bytes());
    data[tag_offset as usize..].copy_from_slice(TEXT);
    data
}
