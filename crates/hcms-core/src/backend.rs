//! Pluggable color math.
//!
//! The engine owns profile bytes, handles, and buffer plumbing; the actual
//! colorimetry is delegated through [`ColorBackend`]. A backend validates
//! profile blobs, links profiles into transforms, and converts pixels. The
//! `hcms-lcms2` crate provides the production implementation on top of
//! Little CMS; tests substitute their own.

use std::any::Any;

use crate::formats::PixelLayout;

/// ICC rendering intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    /// Map a raw intent word to an intent.
    ///
    /// Values above 3 are not an error; they fall back to perceptual, which
    /// is how profiles carrying vendor-specific intent values have always
    /// been treated.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::RelativeColorimetric,
            2 => Self::Saturation,
            3 => Self::AbsoluteColorimetric,
            _ => Self::Perceptual,
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            Self::Perceptual => 0,
            Self::RelativeColorimetric => 1,
            Self::Saturation => 2,
            Self::AbsoluteColorimetric => 3,
        }
    }
}

/// Backend-side state for one open profile.
///
/// Opaque to the engine; a backend downcasts through [`as_any`] to recover
/// its own type when profiles come back in transform creation.
///
/// [`as_any`]: BackendProfile::as_any
pub trait BackendProfile: Send {
    fn as_any(&self) -> &dyn Any;
}

/// Backend-side state for one linked transform.
///
/// A transform is linked against profiles at creation and reconfigured for
/// concrete buffer layouts with [`set_layouts`] before each run. Backend
/// resources are released on drop.
///
/// [`set_layouts`]: BackendTransform::set_layouts
pub trait BackendTransform: Send {
    /// Reconfigure the transform for the given input and output layouts.
    ///
    /// Returns false when the backend cannot convert between this pair, in
    /// which case the transform stays in its previous configuration.
    fn set_layouts(&mut self, input: PixelLayout, output: PixelLayout) -> bool;

    /// Convert `pixels` pixels from `src` to `dst` in the configured
    /// layouts. Both slices must hold exactly `pixels` worth of data.
    fn run(&mut self, src: &[u8], dst: &mut [u8], pixels: usize) -> bool;
}

/// A color math engine.
pub trait ColorBackend: Send + Sync {
    /// Parse and validate a profile blob. `None` rejects the profile, which
    /// surfaces to callers as an invalid-profile error at open time.
    fn open_profile(&self, data: &[u8]) -> Option<Box<dyn BackendProfile>>;

    /// Link an input and output profile into a transform.
    ///
    /// With `target` present the transform soft-proofs: colors are mapped
    /// through the target profile absolute-colorimetrically to preview how
    /// the target device would render them, while `intent` still governs
    /// the input-to-output mapping.
    fn create_transform(
        &self,
        input: &dyn BackendProfile,
        output: &dyn BackendProfile,
        target: Option<&dyn BackendProfile>,
        intent: RenderingIntent,
    ) -> Option<Box<dyn BackendTransform>>;

    /// Link a profile chain into a transform. The engine only hands over
    /// chains it supports; backends may still refuse combinations their
    /// color math cannot express.
    fn create_multi_transform(
        &self,
        profiles: &[&dyn BackendProfile],
        intent: RenderingIntent,
    ) -> Option<Box<dyn BackendTransform>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_raw() {
        assert_eq!(RenderingIntent::from_raw(0), RenderingIntent::Perceptual);
        assert_eq!(
            RenderingIntent::from_raw(1),
            RenderingIntent::RelativeColorimetric
        );
        assert_eq!(RenderingIntent::from_raw(2), RenderingIntent::Saturation);
        assert_eq!(
            RenderingIntent::from_raw(3),
            RenderingIntent::AbsoluteColorimetric
        );
        // Out-of-range raw values degrade to perceptual.
        assert_eq!(RenderingIntent::from_raw(4), RenderingIntent::Perceptual);
        assert_eq!(
            RenderingIntent::from_raw(u32::MAX),
            RenderingIntent::Perceptual
        );
    }

    #[test]
    fn test_intent_roundtrip() {
        for raw in 0..4 {
            assert_eq!(RenderingIntent::from_raw(raw).to_raw(), raw);
        }
    }
}
