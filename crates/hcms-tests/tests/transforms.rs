//! Conversion paths through real color math.
//!
//! Bitmap and color-array translation, proofing and chained transforms,
//! layout fallbacks, and handle lifecycle, all against lcms2-generated
//! profiles.

use hcms_core::{
    Access, BitmapFormat, Cms, Color, ColorType, Disposition, Error, ProfileHandle, ProfileSource,
};
use hcms_tests::fixtures::{gray_icc, srgb_icc, test_cms};
use hcms_tests::patterns::{ramp_rgb8, random_rgb8};

fn open(cms: &Cms, blob: &[u8]) -> ProfileHandle {
    cms.open_profile(
        ProfileSource::Memory(blob),
        Access::Read,
        Disposition::OpenExisting,
    )
    .expect("profile rejected")
}

#[track_caller]
fn assert_close(got: &[u8], want: &[u8], tolerance: i32) {
    assert_eq!(got.len(), want.len());
    for (i, (g, w)) in got.iter().zip(want.iter()).enumerate() {
        let delta = (i32::from(*g) - i32::from(*w)).abs();
        assert!(
            delta <= tolerance,
            "byte {i}: got {g}, want {w} (tolerance {tolerance})"
        );
    }
}

// ============================================================================
// Bitmap Translation
// ============================================================================

/// Test that a packed same-space conversion is an identity within rounding.
#[test]
fn test_bitmap_identity_packed() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 0)
        .expect("transform creation failed");

    let src = ramp_rgb8(64);
    let mut dst = vec![0u8; src.len()];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Rgb8,
        8,
        8,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion failed");
    assert_close(&dst, &src, 1);

    cms.close_transform(transform).expect("close failed");
}

/// Test that strided rows convert in place and padding stays untouched.
#[test]
fn test_bitmap_strided_preserves_padding() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 0)
        .expect("transform creation failed");

    // 2x2 image: source rows every 8 bytes, destination rows every 9.
    let mut src = vec![0u8; 14];
    src[0..6].copy_from_slice(&[10, 20, 30, 40, 50, 60]);
    src[8..14].copy_from_slice(&[70, 80, 90, 100, 110, 120]);
    let mut dst = vec![0xaa_u8; 15];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Rgb8,
        2,
        2,
        8,
        &mut dst,
        BitmapFormat::Rgb8,
        9,
    )
    .expect("conversion failed");
    assert_close(&dst[0..6], &src[0..6], 1);
    assert_eq!(&dst[6..9], &[0xaa; 3]);
    assert_close(&dst[9..15], &src[8..14], 1);

    // A destination one byte short reports the exact size it needs.
    let mut short = vec![0u8; 14];
    assert!(matches!(
        cms.translate_bitmap(
            transform,
            &src,
            BitmapFormat::Rgb8,
            2,
            2,
            8,
            &mut short,
            BitmapFormat::Rgb8,
            9,
        ),
        Err(Error::InsufficientBuffer { required: 15 })
    ));

    // A stride that cannot hold one row is rejected outright.
    assert!(matches!(
        cms.translate_bitmap(
            transform,
            &src,
            BitmapFormat::Rgb8,
            2,
            2,
            4,
            &mut dst,
            BitmapFormat::Rgb8,
            0,
        ),
        Err(Error::InvalidArgument(_))
    ));
}

/// Test that channel order follows the declared bitmap formats.
#[test]
fn test_bitmap_bgr_to_rgb_swaps_channels() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 1)
        .expect("transform creation failed");

    let src = [200u8, 20, 10];
    let mut dst = [0u8; 3];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Bgr8,
        1,
        1,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion failed");
    assert_close(&dst, &[10, 20, 200], 1);

    // Back through the same transform with the orders flipped.
    let mut back = [0u8; 3];
    cms.translate_bitmap(
        transform,
        &dst,
        BitmapFormat::Rgb8,
        1,
        1,
        0,
        &mut back,
        BitmapFormat::Bgr8,
        0,
    )
    .expect("conversion failed");
    assert_close(&back, &src, 2);
}

/// Test that formats without a layout mapping convert as packed RGB.
#[test]
fn test_unmapped_bitmap_format_falls_back() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 0)
        .expect("transform creation failed");

    let src = [10u8, 20, 30, 40, 50, 60];
    let mut dst = [0u8; 6];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Rgb565,
        2,
        1,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion failed");
    assert_close(&dst, &src, 1);
}

// ============================================================================
// Color Array Translation
// ============================================================================

/// Test gray-to-RGB conversion of discrete color values.
#[test]
fn test_gray_to_rgb_colors() {
    let (cms, _dir) = test_cms();
    let gray = open(&cms, &gray_icc());
    let rgb = open(&cms, &srgb_icc());
    let transform = cms
        .create_transform(gray, rgb, None, 1)
        .expect("transform creation failed");

    let converted = cms
        .translate_colors(
            transform,
            &[Color::Gray { gray: 0xffff }, Color::Gray { gray: 0 }],
            ColorType::Gray,
            ColorType::Rgb,
        )
        .expect("conversion failed");
    assert_eq!(converted.len(), 2);

    let Color::Rgb { red, green, blue } = converted[0] else {
        panic!("expected an RGB color, got {:?}", converted[0]);
    };
    for channel in [red, green, blue] {
        assert!(channel >= 0xffff - 514, "white drifted to {channel:#06x}");
    }
    let Color::Rgb { red, green, blue } = converted[1] else {
        panic!("expected an RGB color, got {:?}", converted[1]);
    };
    for channel in [red, green, blue] {
        assert!(channel <= 514, "black drifted to {channel:#06x}");
    }
}

// ============================================================================
// Proofing and Chains
// ============================================================================

/// Test that a proofing transform against the same device stays close to
/// the direct conversion.
#[test]
fn test_proofing_transform_previews_target() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let target = open(&cms, &blob);
    let transform = cms
        .create_transform(a, b, Some(target), 1)
        .expect("proofing transform creation failed");

    let src = [0u8, 64, 128, 192, 255, 30];
    let mut dst = [0u8; 6];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Rgb8,
        2,
        1,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion failed");
    assert_close(&dst, &src, 2);
}

/// Test chain length limits and that a two-profile chain converts.
#[test]
fn test_multi_transform_chain_limits() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let c = open(&cms, &blob);

    assert!(matches!(
        cms.create_multi_transform(&[], &[0], 0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        cms.create_multi_transform(&[a, b], &[], 0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        cms.create_multi_transform(&[a, b, c], &[0], 0),
        Err(Error::NotSupported(_))
    ));

    // Creation flags are accepted and ignored.
    let chain = cms
        .create_multi_transform(&[a, b], &[1], 0x0200)
        .expect("chain creation failed");
    let src = ramp_rgb8(16);
    let mut dst = vec![0u8; src.len()];
    cms.translate_bitmap(
        chain,
        &src,
        BitmapFormat::Rgb8,
        16,
        1,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion failed");
    assert_close(&dst, &src, 1);
}

/// Test that out-of-range intent words degrade instead of failing.
#[test]
fn test_out_of_range_intent_still_links() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 99)
        .expect("transform creation failed");

    let src = ramp_rgb8(4);
    let mut dst = vec![0u8; src.len()];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Rgb8,
        4,
        1,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion failed");
    assert_close(&dst, &src, 1);
}

// ============================================================================
// Handle Lifecycle
// ============================================================================

/// Test that closed handles are dead and transforms outlive their profiles.
#[test]
fn test_closed_handles_reject_use() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 0)
        .expect("transform creation failed");

    // The transform holds its own copies of the profiles.
    cms.close_profile(a).expect("close failed");
    let src = ramp_rgb8(4);
    let mut dst = vec![0u8; src.len()];
    cms.translate_bitmap(
        transform,
        &src,
        BitmapFormat::Rgb8,
        4,
        1,
        0,
        &mut dst,
        BitmapFormat::Rgb8,
        0,
    )
    .expect("conversion after profile close failed");

    // A closed profile handle no longer links.
    assert!(matches!(
        cms.create_transform(a, b, None, 0),
        Err(Error::InvalidHandle(_))
    ));

    cms.close_transform(transform).expect("close failed");
    assert!(matches!(
        cms.close_transform(transform),
        Err(Error::InvalidHandle(_))
    ));
    assert!(matches!(
        cms.translate_colors(transform, &[], ColorType::Rgb, ColorType::Rgb),
        Err(Error::InvalidHandle(_))
    ));
}

/// Test shared conversions racing profile churn on one engine.
#[test]
fn test_concurrent_conversions() {
    let (cms, _dir) = test_cms();
    let blob = srgb_icc();
    let (a, b) = (open(&cms, &blob), open(&cms, &blob));
    let transform = cms
        .create_transform(a, b, None, 0)
        .expect("transform creation failed");
    let src = random_rgb8(7, 256);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut dst = vec![0u8; src.len()];
                for _ in 0..16 {
                    cms.translate_bitmap(
                        transform,
                        &src,
                        BitmapFormat::Rgb8,
                        16,
                        16,
                        0,
                        &mut dst,
                        BitmapFormat::Rgb8,
                        0,
                    )
                    .expect("conversion failed");
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..16 {
                let churn = open(&cms, &blob);
                cms.close_profile(churn).expect("close failed");
            }
        });
    });

    cms.close_transform(transform).expect("close failed");
    cms.close_profile(b).expect("close failed");
    cms.close_profile(a).expect("close failed");
}
