//! ICC tag table access.
//!
//! The tag table sits right after the 128-byte header: a 4-byte entry count
//! followed by 12-byte entries of (signature, offset, size). Offsets are
//! absolute from the start of the profile. Two entries may point at the same
//! byte range under different signatures; such tags are "linked" and share
//! storage.

use crate::error::{Error, Result};
use crate::icc::header::HEADER_LEN;
use crate::icc::types::TagSignature;

/// Byte offset of the tag count word.
pub const TAG_COUNT_OFFSET: usize = HEADER_LEN;

/// Byte offset of the first tag table entry.
pub const TAG_TABLE_OFFSET: usize = HEADER_LEN + 4;

/// Size of one tag table entry in bytes.
pub const TAG_ENTRY_LEN: usize = 12;

/// One decoded tag table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub signature: TagSignature,
    /// Absolute byte offset of the tag data from the start of the profile.
    pub offset: u32,
    /// Tag data size in bytes.
    pub size: u32,
}

/// Result of a tag element read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo {
    /// Number of bytes available (and copied, on success).
    pub len: usize,
    /// Whether another table entry shares this tag's byte range.
    pub linked: bool,
}

/// Number of tag table entries in `data`.
///
/// Returns 0 when the recorded count does not fit in the buffer, so a
/// truncated or hostile profile presents as having no tags rather than
/// driving reads past the end.
pub fn tag_count(data: &[u8]) -> u32 {
    if data.len() < TAG_TABLE_OFFSET {
        return 0;
    }
    let count = u32::from_be_bytes([data[128], data[129], data[130], data[131]]);
    let table_end = TAG_TABLE_OFFSET as u64 + count as u64 * TAG_ENTRY_LEN as u64;
    if table_end > data.len() as u64 {
        return 0;
    }
    count
}

/// Decode the entry at `index` (1-based, matching the public element index).
pub fn get_tag_entry(data: &[u8], index: u32) -> Result<TagEntry> {
    if index == 0 {
        return Err(Error::InvalidArgument("element index is 1-based"));
    }
    if index > tag_count(data) {
        return Err(Error::NotFound);
    }
    let entry = entry_at(data, (index - 1) as usize);
    check_bounds(data, &entry)?;
    Ok(entry)
}

/// Find the entry for `signature`, scanning the table last to first.
///
/// Profiles with duplicate signatures resolve to the entry closest to the
/// end of the table.
pub fn find_tag(data: &[u8], signature: TagSignature) -> Result<TagEntry> {
    let count = tag_count(data) as usize;
    for i in (0..count).rev() {
        let entry = entry_at(data, i);
        if entry.signature == signature {
            check_bounds(data, &entry)?;
            return Ok(entry);
        }
    }
    Err(Error::NotFound)
}

/// First entry under a different signature that shares `entry`'s exact byte
/// range, if any.
pub fn find_linked_tag(data: &[u8], entry: &TagEntry) -> Option<TagSignature> {
    let count = tag_count(data) as usize;
    for i in 0..count {
        let other = entry_at(data, i);
        if other.signature != entry.signature
            && other.offset == entry.offset
            && other.size == entry.size
        {
            return Some(other.signature);
        }
    }
    None
}

/// Read tag data for `signature` starting `byte_offset` bytes into the tag.
///
/// With `out` present and large enough, copies `size - byte_offset` bytes
/// and reports how many. With `out` absent this is a size query: the offset
/// is ignored and the call fails with [`Error::InsufficientBuffer`] carrying
/// the full tag size, so callers can allocate and retry.
pub fn read_element(
    data: &[u8],
    signature: TagSignature,
    byte_offset: u32,
    out: Option<&mut [u8]>,
) -> Result<ElementInfo> {
    let entry = find_tag(data, signature)?;
    let offset = if out.is_some() { byte_offset } else { 0 };
    if offset > entry.size {
        return Err(Error::InvalidArgument("element offset beyond tag data"));
    }
    let available = (entry.size - offset) as usize;
    let Some(buf) = out else {
        return Err(Error::InsufficientBuffer {
            required: available,
        });
    };
    if buf.len() < available {
        return Err(Error::InsufficientBuffer {
            required: available,
        });
    }
    let start = entry.offset as usize + offset as usize;
    buf[..available].copy_from_slice(&data[start..start + available]);
    Ok(ElementInfo {
        len: available,
        linked: find_linked_tag(data, &entry).is_some(),
    })
}

/// Overwrite tag data for `signature` in place, starting `byte_offset` bytes
/// into the tag.
///
/// Tags cannot grow: the write is clamped to the tag's recorded size and the
/// number of bytes actually copied is returned. Writing through one
/// signature of a linked pair is visible through the other, since they share
/// storage.
pub fn write_element(
    data: &mut [u8],
    signature: TagSignature,
    byte_offset: u32,
    input: &[u8],
) -> Result<usize> {
    let entry = find_tag(data, signature)?;
    if byte_offset > entry.size {
        return Err(Error::InvalidArgument("element offset beyond tag data"));
    }
    let copied = ((entry.size - byte_offset) as usize).min(input.len());
    let start = entry.offset as usize + byte_offset as usize;
    data[start..start + copied].copy_from_slice(&input[..copied]);
    Ok(copied)
}

fn entry_at(data: &[u8], index: usize) -> TagEntry {
    let base = TAG_TABLE_OFFSET + index * TAG_ENTRY_LEN;
    let word = |at: usize| {
        u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    };
    TagEntry {
        signature: TagSignature(word(base)),
        offset: word(base + 4),
        size: word(base + 8),
    }
}

fn check_bounds(data: &[u8], entry: &TagEntry) -> Result<()> {
    if entry.offset as u64 + entry.size as u64 > data.len() as u64 {
        return Err(Error::InvalidProfile("tag data out of bounds"));
    }
    Ok(())
}
