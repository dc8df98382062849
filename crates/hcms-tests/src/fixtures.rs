//! Engine and profile fixtures.

use hcms_core::Cms;
use hcms_lcms2::Lcms2Backend;
use lcms2::{CIExyY, Profile, ToneCurve};
use tempfile::TempDir;

/// Engine over a scratch color directory, on the real lcms2 backend.
///
/// The directory is wiped when the returned guard drops, so tests keep it
/// alive for their whole body.
pub fn test_cms() -> (Cms, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir creation failed");
    let cms = Cms::with_color_directory(Lcms2Backend::new(), dir.path());
    (cms, dir)
}

/// Serialized sRGB display profile: class `mntr`, space `RGB `, PCS `XYZ `.
pub fn srgb_icc() -> Vec<u8> {
    Profile::new_srgb().icc().expect("sRGB serialization failed")
}

/// Serialized grayscale display profile with a 2.2 gamma: space `GRAY`.
pub fn gray_icc() -> Vec<u8> {
    let d50 = CIExyY {
        x: 0.3457,
        y: 0.3585,
        Y: 1.0,
    };
    let gamma = ToneCurve::new(2.2);
    let gray = Profile::new_gray(&d50, &gamma).expect("gray profile creation failed");
    gray.icc().expect("gray serialization failed")
}
