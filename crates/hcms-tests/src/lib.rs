//! # hcms-tests
//!
//! End-to-end tests for the hcms engine on the Little CMS 2 backend.
//!
//! The `hcms-core` unit tests pin engine behavior against a passthrough
//! backend; this crate wires `hcms-lcms2` underneath the public API and
//! exercises whole flows instead: profile management against a real color
//! directory, device associations, and pixel conversion through real color
//! math. Fixture profiles are generated with lcms2 at test time rather than
//! checked in, so they always parse with the backend in use.

pub mod fixtures;
pub mod patterns;
