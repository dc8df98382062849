//! Color transforms.
//!
//! A transform pairs profiles through the backend once at creation, then
//! converts either whole bitmaps or arrays of discrete colors. Pixel
//! format translation happens here: caller-facing formats are mapped to
//! backend layouts, with unmapped formats degrading to a default layout
//! under a once-per-format warning.

use crate::backend::{BackendProfile, BackendTransform, RenderingIntent};
use crate::cms::{Cms, lock};
use crate::error::{Error, Result};
use crate::formats::{BitmapFormat, Color, ColorType, PixelLayout};
use crate::handle::{ProfileHandle, TransformHandle};

/// A linked transform registered in the handle table.
pub(crate) struct Transform {
    engine: Box<dyn BackendTransform>,
}

impl Cms {
    /// Link `source` and `destination` profiles into a transform.
    ///
    /// `intent` is a raw rendering intent word; out-of-range values degrade
    /// to perceptual. With `target` given the transform soft-proofs that
    /// device: the proofing leg always runs absolute-colorimetric while
    /// `intent` governs the source-to-destination mapping.
    pub fn create_transform(
        &self,
        source: ProfileHandle,
        destination: ProfileHandle,
        target: Option<ProfileHandle>,
        intent: u32,
    ) -> Result<TransformHandle> {
        let intent = RenderingIntent::from_raw(intent);
        let profiles = lock(&self.profiles);
        let input = profiles
            .get(source.0)
            .ok_or(Error::InvalidHandle(source.0))?;
        let output = profiles
            .get(destination.0)
            .ok_or(Error::InvalidHandle(destination.0))?;
        let proof = match target {
            Some(handle) => Some(
                profiles
                    .get(handle.0)
                    .ok_or(Error::InvalidHandle(handle.0))?,
            ),
            None => None,
        };
        let engine = self
            .backend
            .create_transform(
                input.engine(),
                output.engine(),
                proof.map(|profile| profile.engine()),
                intent,
            )
            .ok_or(Error::InvalidProfile("profiles could not be linked"))?;
        drop(profiles);
        let handle = lock(&self.transforms).insert(Transform { engine });
        tracing::debug!(handle, ?intent, proofing = target.is_some(), "created transform");
        Ok(TransformHandle(handle))
    }

    /// Link a chain of one or two profiles into a transform.
    ///
    /// Longer chains fail with [`Error::NotSupported`] rather than being
    /// silently truncated. Only the first intent is used, applied uniformly
    /// across the chain; `flags` is accepted for interface compatibility
    /// and ignored.
    pub fn create_multi_transform(
        &self,
        profiles: &[ProfileHandle],
        intents: &[u32],
        flags: u32,
    ) -> Result<TransformHandle> {
        if profiles.is_empty() || intents.is_empty() {
            return Err(Error::InvalidArgument(
                "profile and intent arrays must be non-empty",
            ));
        }
        if profiles.len() > 2 {
            return Err(Error::NotSupported(
                "transform chains longer than two profiles",
            ));
        }
        if flags != 0 {
            tracing::debug!(flags, "ignoring transform creation flags");
        }
        let intent = RenderingIntent::from_raw(intents[0]);
        let table = lock(&self.profiles);
        let mut resolved = Vec::with_capacity(profiles.len());
        for handle in profiles {
            resolved.push(table.get(handle.0).ok_or(Error::InvalidHandle(handle.0))?);
        }
        let engines: Vec<&dyn BackendProfile> =
            resolved.iter().map(|profile| profile.engine()).collect();
        let engine = self
            .backend
            .create_multi_transform(&engines, intent)
            .ok_or(Error::InvalidProfile("profiles could not be linked"))?;
        drop(table);
        let handle = lock(&self.transforms).insert(Transform { engine });
        tracing::debug!(handle, chain = profiles.len(), ?intent, "created multi-profile transform");
        Ok(TransformHandle(handle))
    }

    /// Release the transform behind `handle`, backend resources included.
    pub fn close_transform(&self, handle: TransformHandle) -> Result<()> {
        let mut transforms = lock(&self.transforms);
        transforms
            .remove(handle.0)
            .ok_or(Error::InvalidHandle(handle.0))?;
        tracing::debug!(handle = handle.0, "closed transform");
        Ok(())
    }

    /// Convert a bitmap through the transform.
    ///
    /// Strides give the distance between row starts in bytes; 0 means rows
    /// are packed edge to edge. A packed bitmap converts in one backend
    /// call, a padded one row by row. The destination must hold the full
    /// converted bitmap or the call fails up front with the required size;
    /// it is never partially written on a failed size check. Empty bitmaps
    /// are a no-op success.
    #[allow(clippy::too_many_arguments)]
    pub fn translate_bitmap(
        &self,
        handle: TransformHandle,
        src: &[u8],
        src_format: BitmapFormat,
        width: u32,
        height: u32,
        src_stride: u32,
        dst: &mut [u8],
        dst_format: BitmapFormat,
        dst_stride: u32,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let src_layout = self.bitmap_layout(src_format);
        let dst_layout = self.bitmap_layout(dst_format);
        let width = width as usize;
        let rows = height as usize;

        let src_row = width * src_layout.bytes_per_pixel();
        let dst_row = width * dst_layout.bytes_per_pixel();
        let src_stride = effective_stride(src_stride, src_row)?;
        let dst_stride = effective_stride(dst_stride, dst_row)?;

        let src_required = src_stride * (rows - 1) + src_row;
        if src.len() < src_required {
            return Err(Error::InvalidArgument(
                "source buffer shorter than the described bitmap",
            ));
        }
        let dst_required = dst_stride * (rows - 1) + dst_row;
        if dst.len() < dst_required {
            return Err(Error::InsufficientBuffer {
                required: dst_required,
            });
        }

        let mut transforms = lock(&self.transforms);
        let transform = transforms
            .get_mut(handle.0)
            .ok_or(Error::InvalidHandle(handle.0))?;
        if !transform.engine.set_layouts(src_layout, dst_layout) {
            return Err(Error::NotSupported(
                "pixel layout pair rejected by the color engine",
            ));
        }

        if src_stride == src_row && dst_stride == dst_row {
            run(
                transform,
                &src[..src_required],
                &mut dst[..dst_required],
                width * rows,
            )
        } else {
            for row in 0..rows {
                let s = row * src_stride;
                let d = row * dst_stride;
                run(
                    transform,
                    &src[s..s + src_row],
                    &mut dst[d..d + dst_row],
                    width,
                )?;
            }
            Ok(())
        }
    }

    /// Convert discrete color values through the transform.
    ///
    /// Each color passes through a fixed-size scratch cell one at a time;
    /// this path is sized for palettes and picker swatches, not images.
    /// The cell is shared storage the way the caller-facing color union
    /// is: a value is read according to `input_type` no matter which
    /// variant carried it.
    pub fn translate_colors(
        &self,
        handle: TransformHandle,
        input: &[Color],
        input_type: ColorType,
        output_type: ColorType,
    ) -> Result<Vec<Color>> {
        let in_layout = self.color_layout(input_type);
        let out_layout = self.color_layout(output_type);

        let mut transforms = lock(&self.transforms);
        let transform = transforms
            .get_mut(handle.0)
            .ok_or(Error::InvalidHandle(handle.0))?;
        if !transform.engine.set_layouts(in_layout, out_layout) {
            return Err(Error::NotSupported(
                "pixel layout pair rejected by the color engine",
            ));
        }

        let mut converted = Vec::with_capacity(input.len());
        for color in input {
            let mut src = [0u8; Color::CELL];
            let mut dst = [0u8; Color::CELL];
            color.encode(&mut src);
            run(
                transform,
                &src[..in_layout.bytes_per_pixel()],
                &mut dst[..out_layout.bytes_per_pixel()],
                1,
            )?;
            converted.push(Color::decode(output_type, &dst));
        }
        Ok(converted)
    }

    fn bitmap_layout(&self, format: BitmapFormat) -> PixelLayout {
        match format.layout() {
            Some(layout) => layout,
            None => {
                self.note_unmapped_bitmap(format);
                PixelLayout::Rgb8
            }
        }
    }

    fn color_layout(&self, ty: ColorType) -> PixelLayout {
        match ty.layout() {
            Some(layout) => layout,
            None => {
                self.note_unmapped_color(ty);
                PixelLayout::Rgb16
            }
        }
    }
}

fn run(transform: &mut Transform, src: &[u8], dst: &mut [u8], pixels: usize) -> Result<()> {
    if transform.engine.run(src, dst, pixels) {
        Ok(())
    } else {
        Err(Error::NotSupported("conversion rejected by the color engine"))
    }
}

fn effective_stride(stride: u32, row: usize) -> Result<usize> {
    if stride == 0 {
        return Ok(row);
    }
    let stride = stride as usize;
    if stride < row {
        return Err(Error::InvalidArgument("stride smaller than a pixel row"));
    }
    Ok(stride)
}
