//! ICC profile basic types.
//!
//! Signatures are 4-byte ASCII codes stored as big-endian u32 values, per
//! ICC.1:2022 Section 7.2.

/// Convert a 4-character ASCII code to its big-endian u32 value.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// Render a signature value as its 4-character ASCII code.
pub fn fourcc_string(value: u32) -> String {
    String::from_utf8_lossy(&value.to_be_bytes()).into_owned()
}

/// ICC tag signature (4-byte ASCII code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagSignature(pub u32);

impl TagSignature {
    /// Create from 4 ASCII characters
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// The 4 ASCII characters of this signature
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    // Common tag signatures
    pub const BLUE_COLORANT: Self = Self::from_bytes(*b"bXYZ");
    pub const BLUE_TRC: Self = Self::from_bytes(*b"bTRC");
    pub const CHAD: Self = Self::from_bytes(*b"chad");
    pub const COPYRIGHT: Self = Self::from_bytes(*b"cprt");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const GREEN_COLORANT: Self = Self::from_bytes(*b"gXYZ");
    pub const GREEN_TRC: Self = Self::from_bytes(*b"gTRC");
    pub const MEDIA_BLACK: Self = Self::from_bytes(*b"bkpt");
    pub const MEDIA_WHITE: Self = Self::from_bytes(*b"wtpt");
    pub const RED_COLORANT: Self = Self::from_bytes(*b"rXYZ");
    pub const RED_TRC: Self = Self::from_bytes(*b"rTRC");
}

impl std::fmt::Display for TagSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", fourcc_string(self.0))
    }
}

/// Well-known profile/device class signatures for the header's class field.
pub mod class {
    use super::fourcc;

    pub const INPUT: u32 = fourcc(b"scnr");
    pub const DISPLAY: u32 = fourcc(b"mntr");
    pub const OUTPUT: u32 = fourcc(b"prtr");
    pub const LINK: u32 = fourcc(b"link");
    pub const ABSTRACT: u32 = fourcc(b"abst");
    pub const COLOR_SPACE: u32 = fourcc(b"spac");
    pub const NAMED_COLOR: u32 = fourcc(b"nmcl");
}

/// Well-known color space signatures for the header's data color space
/// and connection space fields.
pub mod space {
    use super::fourcc;

    pub const XYZ: u32 = fourcc(b"XYZ ");
    pub const LAB: u32 = fourcc(b"Lab ");
    pub const RGB: u32 = fourcc(b"RGB ");
    pub const GRAY: u32 = fourcc(b"GRAY");
    pub const CMYK: u32 = fourcc(b"CMYK");
    pub const YXY: u32 = fourcc(b"Yxy ");
}

/// s15Fixed16Number - signed 16.16 fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S15Fixed16(pub i32);

impl S15Fixed16 {
    /// Create from raw i32 value
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Create from f64 value
    pub fn from_f64(val: f64) -> Self {
        Self((val * 65536.0) as i32)
    }

    /// Convert to f64
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    /// Parse from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(bytes))
    }

    /// Big-endian byte representation
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

/// XYZNumber - ICC XYZ value (3 x s15Fixed16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XyzNumber {
    pub x: S15Fixed16,
    pub y: S15Fixed16,
    pub z: S15Fixed16,
}

impl XyzNumber {
    /// Parse from 12 big-endian bytes
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self {
            x: S15Fixed16::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            y: S15Fixed16::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            z: S15Fixed16::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        }
    }

    /// Serialize to 12 big-endian bytes
    pub fn to_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.x.to_be_bytes());
        out[4..8].copy_from_slice(&self.y.to_be_bytes());
        out[8..12].copy_from_slice(&self.z.to_be_bytes());
        out
    }
}
