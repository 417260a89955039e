//! Minimal content-addressable object store speaking git's loose-object
//! format.
//!
//! Blob, tree, and commit objects are framed as
//! `"{kind} {len}\0{payload}"`, addressed by the SHA-1 of those canonical
//! bytes, and kept zlib-compressed under `objects/<2 hex>/<38 hex>`.
//! Digests are bit-for-bit compatible with real git for the same content.

pub mod cmd;
pub mod error;
pub mod oid;
pub mod repository;

pub use error::{Error, Result};
pub use oid::Oid;
