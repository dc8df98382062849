//! Little CMS 2 backend.
//!
//! Implements [`ColorBackend`] on top of the `lcms2` crate. Open profiles
//! keep their raw ICC bytes; a transform parses them into a fresh
//! [`ThreadContext`] each time it is linked, so the resulting pipeline owns
//! all of its state and can move between threads. Relinking happens when
//! the engine reconfigures a transform for new pixel layouts.

use std::any::Any;
use std::sync::Arc;

use lcms2::{
    AllowCache, ColorSpaceSignatureExt, Flags, Intent, PixelFormat, Profile, ThreadContext,
    Transform,
};

use hcms_core::{BackendProfile, BackendTransform, ColorBackend, PixelLayout, RenderingIntent};

/// Color engine backed by Little CMS 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lcms2Backend;

impl Lcms2Backend {
    pub fn new() -> Self {
        Self
    }
}

struct Lcms2Profile {
    data: Arc<[u8]>,
    /// Default pixel layout, derived from the profile's channel count.
    layout: PixelLayout,
}

impl BackendProfile for Lcms2Profile {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Profile bytes a transform was linked from, kept for relinking.
enum TransformProfiles {
    Direct {
        input: Arc<[u8]>,
        output: Arc<[u8]>,
    },
    Proofing {
        input: Arc<[u8]>,
        output: Arc<[u8]>,
        target: Arc<[u8]>,
    },
    Chain(Vec<Arc<[u8]>>),
}

struct Lcms2Transform {
    profiles: TransformProfiles,
    intent: Intent,
    layouts: (PixelLayout, PixelLayout),
    inner: Transform<u8, u8, ThreadContext, AllowCache>,
}

impl Lcms2Transform {
    /// Parse the stored profiles into a fresh context and link them for the
    /// given layouts.
    fn link(
        profiles: &TransformProfiles,
        intent: Intent,
        layouts: (PixelLayout, PixelLayout),
    ) -> Option<Transform<u8, u8, ThreadContext, AllowCache>> {
        let ctx = ThreadContext::new();
        let in_format = pixel_format(layouts.0);
        let out_format = pixel_format(layouts.1);
        let linked = match profiles {
            TransformProfiles::Direct { input, output } => {
                let input = parse(&ctx, input)?;
                let output = parse(&ctx, output)?;
                Transform::new_context(ctx, &input, in_format, &output, out_format, intent)
            }
            TransformProfiles::Proofing {
                input,
                output,
                target,
            } => {
                let input = parse(&ctx, input)?;
                let output = parse(&ctx, output)?;
                let target = parse(&ctx, target)?;
                // The preview maps through the target device absolute
                // colorimetrically; `intent` still governs input to output.
                Transform::new_proofing_context(
                    ctx,
                    &input,
                    in_format,
                    &output,
                    out_format,
                    &target,
                    intent,
                    Intent::AbsoluteColorimetric,
                    Flags::SOFT_PROOFING,
                )
            }
            TransformProfiles::Chain(chain) => {
                let mut parsed = Vec::with_capacity(chain.len());
                for data in chain {
                    parsed.push(parse(&ctx, data)?);
                }
                let refs: Vec<&Profile<ThreadContext>> = parsed.iter().collect();
                Transform::new_multiprofile_context(
                    ctx,
                    &refs,
                    in_format,
                    out_format,
                    intent,
                    Flags::default(),
                )
            }
        };
        match linked {
            Ok(transform) => Some(transform),
            Err(err) => {
                tracing::debug!(error = %err, "lcms2 could not link profiles");
                None
            }
        }
    }
}

impl BackendTransform for Lcms2Transform {
    fn set_layouts(&mut self, input: PixelLayout, output: PixelLayout) -> bool {
        if self.layouts == (input, output) {
            return true;
        }
        match Self::link(&self.profiles, self.intent, (input, output)) {
            Some(inner) => {
                self.inner = inner;
                self.layouts = (input, output);
                true
            }
            None => false,
        }
    }

    fn run(&mut self, src: &[u8], dst: &mut [u8], pixels: usize) -> bool {
        let (input, output) = self.layouts;
        if src.len() != pixels * input.bytes_per_pixel()
            || dst.len() != pixels * output.bytes_per_pixel()
        {
            return false;
        }
        self.inner.transform_pixels(src, dst);
        true
    }
}

impl ColorBackend for Lcms2Backend {
    fn open_profile(&self, data: &[u8]) -> Option<Box<dyn BackendProfile>> {
        let ctx = ThreadContext::new();
        let profile = parse(&ctx, data)?;
        let layout = default_layout(profile.color_space().channels());
        Some(Box::new(Lcms2Profile {
            data: data.into(),
            layout,
        }))
    }

    fn create_transform(
        &self,
        input: &dyn BackendProfile,
        output: &dyn BackendProfile,
        target: Option<&dyn BackendProfile>,
        intent: RenderingIntent,
    ) -> Option<Box<dyn BackendTransform>> {
        let input = downcast(input)?;
        let output = downcast(output)?;
        let layouts = (input.layout, output.layout);
        let profiles = match target {
            Some(target) => TransformProfiles::Proofing {
                input: Arc::clone(&input.data),
                output: Arc::clone(&output.data),
                target: Arc::clone(&downcast(target)?.data),
            },
            None => TransformProfiles::Direct {
                input: Arc::clone(&input.data),
                output: Arc::clone(&output.data),
            },
        };
        let intent = map_intent(intent);
        let inner = Lcms2Transform::link(&profiles, intent, layouts)?;
        Some(Box::new(Lcms2Transform {
            profiles,
            intent,
            layouts,
            inner,
        }))
    }

    fn create_multi_transform(
        &self,
        profiles: &[&dyn BackendProfile],
        intent: RenderingIntent,
    ) -> Option<Box<dyn BackendTransform>> {
        let first = downcast(*profiles.first()?)?;
        let last = downcast(*profiles.last()?)?;
        let layouts = (first.layout, last.layout);
        let chain = profiles
            .iter()
            .map(|profile| downcast(*profile).map(|p| Arc::clone(&p.data)))
            .collect::<Option<Vec<_>>>()?;
        let profiles = TransformProfiles::Chain(chain);
        let intent = map_intent(intent);
        let inner = Lcms2Transform::link(&profiles, intent, layouts)?;
        Some(Box::new(Lcms2Transform {
            profiles,
            intent,
            layouts,
            inner,
        }))
    }
}

fn parse(ctx: &ThreadContext, data: &[u8]) -> Option<Profile<ThreadContext>> {
    match Profile::new_icc_context(ctx, data) {
        Ok(profile) => Some(profile),
        Err(err) => {
            tracing::debug!(error = %err, "lcms2 rejected profile");
            None
        }
    }
}

fn downcast(profile: &dyn BackendProfile) -> Option<&Lcms2Profile> {
    profile.as_any().downcast_ref()
}

fn default_layout(channels: u32) -> PixelLayout {
    match channels {
        1 => PixelLayout::Gray8,
        4 => PixelLayout::Cmyk8,
        _ => PixelLayout::Rgb8,
    }
}

fn map_intent(intent: RenderingIntent) -> Intent {
    match intent {
        RenderingIntent::Perceptual => Intent::Perceptual,
        RenderingIntent::RelativeColorimetric => Intent::RelativeColorimetric,
        RenderingIntent::Saturation => Intent::Saturation,
        RenderingIntent::AbsoluteColorimetric => Intent::AbsoluteColorimetric,
    }
}

fn pixel_format(layout: PixelLayout) -> PixelFormat {
    match layout {
        PixelLayout::Gray8 => PixelFormat::GRAY_8,
        PixelLayout::Rgb8 => PixelFormat::RGB_8,
        PixelLayout::Bgr8 => PixelFormat::BGR_8,
        PixelLayout::Xrgb8 => PixelFormat::ARGB_8,
        PixelLayout::Xbgr8 => PixelFormat::ABGR_8,
        PixelLayout::Cmyk8 => PixelFormat::CMYK_8,
        PixelLayout::Kymc8 => PixelFormat::KYMC_8,
        PixelLayout::Gray16 => PixelFormat::GRAY_16,
        PixelLayout::Rgb16 => PixelFormat::RGB_16,
        PixelLayout::Xyz16 => PixelFormat::XYZ_16,
        PixelLayout::Yxy16 => PixelFormat::Yxy_16,
        PixelLayout::Lab16 => PixelFormat::Lab_16,
        PixelLayout::Cmyk16 => PixelFormat::CMYK_16,
    }
}
