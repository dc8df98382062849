//! ICC profile header codec.
//!
//! The 128-byte header layout per ICC.1:2022 Section 7.2. Fields are kept as
//! raw big-endian-decoded words rather than validated enums: the engine must
//! round-trip headers it does not understand, and callers match on raw
//! signature values when enumerating.

use crate::error::{Error, Result};
use crate::icc::types::{S15Fixed16, XyzNumber, fourcc};

/// Size of the ICC profile header in bytes.
pub const HEADER_LEN: usize = 128;

/// The `'acsp'` magic at byte offset 36 of every ICC profile.
pub const PROFILE_SIGNATURE: u32 = fourcc(b"acsp");

/// Decoded ICC profile header.
///
/// Every multi-byte field is a big-endian word in the file; decoding swaps
/// each 4-byte unit to native order and encoding swaps it back, so
/// `encode(decode(bytes)) == bytes` for any 128-byte input. The date/time
/// and attributes fields are kept as raw word arrays because the engine
/// never interprets them, and the reserved tail is carried verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileHeader {
    /// Total profile size in bytes, as recorded by the profile creator.
    pub size: u32,
    /// Preferred CMM signature, 0 if none.
    pub cmm_type: u32,
    /// Profile version in binary-coded decimal, e.g. 0x04300000.
    pub version: u32,
    /// Profile/device class signature, see [`crate::icc::types::class`].
    pub device_class: u32,
    /// Data color space signature, see [`crate::icc::types::space`].
    pub color_space: u32,
    /// Profile connection space signature, `'XYZ '` or `'Lab '`.
    pub pcs: u32,
    /// Creation date and time as three raw words (the dateTimeNumber packs
    /// six u16 fields into 12 bytes).
    pub date_time: [u32; 3],
    /// File signature, [`PROFILE_SIGNATURE`] in a well-formed profile.
    pub signature: u32,
    /// Primary platform signature, 0 if none.
    pub platform: u32,
    /// Profile flags.
    pub flags: u32,
    /// Device manufacturer signature.
    pub manufacturer: u32,
    /// Device model signature.
    pub model: u32,
    /// Device attributes as two raw words.
    pub attributes: [u32; 2],
    /// Rendering intent, 0 through 3.
    pub rendering_intent: u32,
    /// PCS illuminant, nominally D50.
    pub illuminant: XyzNumber,
    /// Profile creator signature.
    pub creator: u32,
    /// Reserved tail, bytes 84..128, carried through unswapped.
    pub reserved: [u8; 44],
}

// Not derivable: std has no `Default` for arrays past 32 elements, and
// `reserved` is 44.
impl Default for ProfileHeader {
    fn default() -> Self {
        Self {
            size: 0,
            cmm_type: 0,
            version: 0,
            device_class: 0,
            color_space: 0,
            pcs: 0,
            date_time: [0; 3],
            signature: 0,
            platform: 0,
            flags: 0,
            manufacturer: 0,
            model: 0,
            attributes: [0; 2],
            rendering_intent: 0,
            illuminant: XyzNumber::default(),
            creator: 0,
            reserved: [0; 44],
        }
    }
}

impl ProfileHeader {
    /// Decode the first 128 bytes of `data` as a profile header.
    ///
    /// Only the length is checked here; field values are taken as-is.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::InvalidProfile(
                "profile shorter than the 128 byte header",
            ));
        }
        let mut reserved = [0u8; 44];
        reserved.copy_from_slice(&data[84..128]);
        Ok(Self {
            size: read_u32(data, 0),
            cmm_type: read_u32(data, 4),
            version: read_u32(data, 8),
            device_class: read_u32(data, 12),
            color_space: read_u32(data, 16),
            pcs: read_u32(data, 20),
            date_time: [read_u32(data, 24), read_u32(data, 28), read_u32(data, 32)],
            signature: read_u32(data, 36),
            platform: read_u32(data, 40),
            flags: read_u32(data, 44),
            manufacturer: read_u32(data, 48),
            model: read_u32(data, 52),
            attributes: [read_u32(data, 56), read_u32(data, 60)],
            rendering_intent: read_u32(data, 64),
            illuminant: XyzNumber {
                x: S15Fixed16::from_raw(read_u32(data, 68) as i32),
                y: S15Fixed16::from_raw(read_u32(data, 72) as i32),
                z: S15Fixed16::from_raw(read_u32(data, 76) as i32),
            },
            creator: read_u32(data, 80),
            reserved,
        })
    }

    /// Encode the header back to its 128-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        write_u32(&mut out, 0, self.size);
        write_u32(&mut out, 4, self.cmm_type);
        write_u32(&mut out, 8, self.version);
        write_u32(&mut out, 12, self.device_class);
        write_u32(&mut out, 16, self.color_space);
        write_u32(&mut out, 20, self.pcs);
        write_u32(&mut out, 24, self.date_time[0]);
        write_u32(&mut out, 28, self.date_time[1]);
        write_u32(&mut out, 32, self.date_time[2]);
        write_u32(&mut out, 36, self.signature);
        write_u32(&mut out, 40, self.platform);
        write_u32(&mut out, 44, self.flags);
        write_u32(&mut out, 48, self.manufacturer);
        write_u32(&mut out, 52, self.model);
        write_u32(&mut out, 56, self.attributes[0]);
        write_u32(&mut out, 60, self.attributes[1]);
        write_u32(&mut out, 64, self.rendering_intent);
        write_u32(&mut out, 68, self.illuminant.x.0 as u32);
        write_u32(&mut out, 72, self.illuminant.y.0 as u32);
        write_u32(&mut out, 76, self.illuminant.z.0 as u32);
        write_u32(&mut out, 80, self.creator);
        out[84..128].copy_from_slice(&self.reserved);
        out
    }

    /// Whether the header carries the `'acsp'` file signature.
    pub fn is_signed(&self) -> bool {
        self.signature == PROFILE_SIGNATURE
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}
