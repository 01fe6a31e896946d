//! Wire primitives for the solidify object-graph codec.
//!
//! Everything here is sequential and little-endian. The crate knows nothing
//! about types, caches or graphs; it only turns numbers into bytes and back.
//!
//! # Key Types
//!
//! - [`WireWriter`]: byte-counting writer over any [`std::io::Write`]
//! - [`WireReader`]: byte-counting reader over any [`std::io::Read`]
//! - [`WireError`]: malformed data, out-of-range packed values, I/O
//!
//! The packed encodings are extra methods on those two types:
//! packed integers in [`packed`], nullable floats in [`float`] and boolean
//! vectors in [`bits`].

pub mod bits;
pub mod error;
pub mod float;
pub mod packed;
pub mod reader;
pub mod writer;

pub use bits::packed_len;
pub use error::{WireError, WireResult};
pub use packed::{PACKED_I16_MIN, PACKED_I32_MIN, PACKED_I64_MIN};
pub use reader::WireReader;
pub use writer::{WireWriter, FALSE_BYTE, TRUE_BYTE};
