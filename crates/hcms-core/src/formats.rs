//! Pixel and color formats.
//!
//! Callers describe buffers with [`BitmapFormat`] and single colors with
//! [`ColorType`]; both map onto the smaller set of [`PixelLayout`] values a
//! backend actually converts between. Formats without a mapping are not
//! rejected: bitmaps degrade to packed RGB 8, colors to RGB 16, and the
//! engine logs the substitution once per format.

/// A concrete in-memory pixel layout.
///
/// Multi-byte channels are native-endian words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    Gray8,
    Rgb8,
    Bgr8,
    /// 4 bytes per pixel, padding byte first.
    Xrgb8,
    Xbgr8,
    Cmyk8,
    /// CMYK with channels reversed, as some printer paths emit it.
    Kymc8,
    Gray16,
    Rgb16,
    Xyz16,
    Yxy16,
    Lab16,
    Cmyk16,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Gray16 => 2,
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Xrgb8 | Self::Xbgr8 | Self::Cmyk8 | Self::Kymc8 => 4,
            Self::Rgb16 | Self::Xyz16 | Self::Yxy16 | Self::Lab16 => 6,
            Self::Cmyk16 => 8,
        }
    }
}

/// Pixel format of a bitmap handed to the transform engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum BitmapFormat {
    /// 8-bit grayscale.
    Gray8,
    /// Packed 8-bit RGB triplets.
    Rgb8,
    /// Packed 8-bit BGR triplets.
    Bgr8,
    /// 8-bit RGB quads with a padding byte.
    Xrgb8,
    /// 8-bit BGR quads with a padding byte.
    Xbgr8,
    /// 8-bit CMYK quads.
    Cmyk8,
    /// 8-bit KYMC quads.
    Kymc8,
    /// 5-5-5 packed RGB. Not mapped.
    Rgb555,
    /// 5-6-5 packed RGB. Not mapped.
    Rgb565,
    /// 10-bit-per-channel packed RGB. Not mapped.
    Rgb101010,
    /// 16-bit RGB. Not mapped.
    Rgb16,
    /// 16-bit XYZ. Not mapped.
    Xyz16,
    /// 16-bit Yxy. Not mapped.
    Yxy16,
    /// 16-bit Lab. Not mapped.
    Lab16,
}

impl BitmapFormat {
    /// Pixel layout this format converts as, or `None` for formats that
    /// fall back to [`PixelLayout::Rgb8`].
    pub fn layout(self) -> Option<PixelLayout> {
        match self {
            Self::Gray8 => Some(PixelLayout::Gray8),
            Self::Rgb8 => Some(PixelLayout::Rgb8),
            Self::Bgr8 => Some(PixelLayout::Bgr8),
            Self::Xrgb8 => Some(PixelLayout::Xrgb8),
            Self::Xbgr8 => Some(PixelLayout::Xbgr8),
            Self::Cmyk8 => Some(PixelLayout::Cmyk8),
            Self::Kymc8 => Some(PixelLayout::Kymc8),
            _ => None,
        }
    }

    /// Layout actually used for buffers in this format, after fallback.
    pub fn effective_layout(self) -> PixelLayout {
        self.layout().unwrap_or(PixelLayout::Rgb8)
    }
}

/// Color space of a [`Color`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum ColorType {
    Gray,
    Rgb,
    Xyz,
    Yxy,
    Lab,
    Cmyk,
    /// Generic three-channel color. Not mapped.
    ThreeChannel,
    /// Index into a named color palette. Not mapped.
    Named,
}

impl ColorType {
    /// Pixel layout colors of this type convert as, or `None` for types
    /// that fall back to [`PixelLayout::Rgb16`].
    pub fn layout(self) -> Option<PixelLayout> {
        match self {
            Self::Gray => Some(PixelLayout::Gray16),
            Self::Rgb => Some(PixelLayout::Rgb16),
            Self::Xyz => Some(PixelLayout::Xyz16),
            Self::Yxy => Some(PixelLayout::Yxy16),
            Self::Lab => Some(PixelLayout::Lab16),
            Self::Cmyk => Some(PixelLayout::Cmyk16),
            _ => None,
        }
    }

    /// Layout actually used for colors of this type, after fallback.
    pub fn effective_layout(self) -> PixelLayout {
        self.layout().unwrap_or(PixelLayout::Rgb16)
    }
}

/// One device color with 16-bit channels.
///
/// Conversion reads the value according to the color type the caller
/// declares, not the variant: channels are laid into an 8-byte scratch cell
/// in declaration order, so a mismatched declaration reinterprets channels
/// positionally instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Gray { gray: u16 },
    Rgb { red: u16, green: u16, blue: u16 },
    Xyz { x: u16, y: u16, z: u16 },
    Yxy { luminance: u16, x: u16, y: u16 },
    Lab { l: u16, a: u16, b: u16 },
    Cmyk { cyan: u16, magenta: u16, yellow: u16, black: u16 },
    ThreeChannel { ch1: u16, ch2: u16, ch3: u16 },
    Named { index: u32 },
}

impl Color {
    /// Number of bytes a color occupies in its scratch cell.
    pub const CELL: usize = 8;

    /// Lay the channels into `out` as native-endian words.
    pub fn encode(self, out: &mut [u8; Self::CELL]) {
        let words: [u16; 4] = match self {
            Self::Gray { gray } => [gray, 0, 0, 0],
            Self::Rgb { red, green, blue } => [red, green, blue, 0],
            Self::Xyz { x, y, z } => [x, y, z, 0],
            Self::Yxy { luminance, x, y } => [luminance, x, y, 0],
            Self::Lab { l, a, b } => [l, a, b, 0],
            Self::Cmyk {
                cyan,
                magenta,
                yellow,
                black,
            } => [cyan, magenta, yellow, black],
            Self::ThreeChannel { ch1, ch2, ch3 } => [ch1, ch2, ch3, 0],
            Self::Named { index } => {
                *out = [0; Self::CELL];
                out[0..4].copy_from_slice(&index.to_ne_bytes());
                return;
            }
        };
        *out = bytemuck::cast(words);
    }

    /// Read a color of type `ty` back out of a scratch cell.
    pub fn decode(ty: ColorType, cell: &[u8; Self::CELL]) -> Self {
        let words: [u16; 4] = bytemuck::cast(*cell);
        match ty {
            ColorType::Gray => Self::Gray { gray: words[0] },
            ColorType::Rgb => Self::Rgb {
                red: words[0],
                green: words[1],
                blue: words[2],
            },
            ColorType::Xyz => Self::Xyz {
                x: words[0],
                y: words[1],
                z: words[2],
            },
            ColorType::Yxy => Self::Yxy {
                luminance: words[0],
                x: words[1],
                y: words[2],
            },
            ColorType::Lab => Self::Lab {
                l: words[0],
                a: words[1],
                b: words[2],
            },
            ColorType::Cmyk => Self::Cmyk {
                cyan: words[0],
                magenta: words[1],
                yellow: words[2],
                black: words[3],
            },
            ColorType::ThreeChannel => Self::ThreeChannel {
                ch1: words[0],
                ch2: words[1],
                ch3: words[2],
            },
            ColorType::Named => Self::Named {
                index: u32::from_ne_bytes([cell[0], cell[1], cell[2], cell[3]]),
            },
        }
    }
}
