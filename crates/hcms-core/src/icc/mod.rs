//! ICC profile binary format: header codec and tag table access.
//!
//! Everything in this module operates on plain byte slices. Profiles are
//! kept in memory as the exact bytes read from disk, and all reads and
//! writes against them go through these functions, so a profile that is
//! opened and written back untouched stays byte-identical.

pub mod header;
pub mod tags;
pub mod types;

pub use header::{HEADER_LEN, PROFILE_SIGNATURE, ProfileHeader};
pub use tags::{ElementInfo, TagEntry};
pub use types::{S15Fixed16, TagSignature, XyzNumber};
