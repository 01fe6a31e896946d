//! Engine of the solidify object-graph codec.
//!
//! "Liquify" turns typed values into bytes and "solidify" turns them back.
//! Every type that can appear on the wire is handled by one
//! [`ObjectProcessor`] in a [`Registry`] supplied by the caller; nothing is
//! discovered at runtime and nothing about types is written to the stream.
//!
//! Cached types share values through per-session object caches. Each header
//! is a packed integer: non-negative values refer back to an earlier object,
//! negative values announce a new one (and carry its length when it has one).
//! Readers allocate an object's cache slot before decoding its body, so
//! shared and cyclic object graphs round-trip without unbounded recursion.
//!
//! # Key Types
//!
//! - [`Liquifier`] / [`Solidifier`]: one encode or decode session over a stream
//! - [`Registry`]: the closed set of processors for a session
//! - [`ObjectProcessor`]: per-type encode and decode logic
//! - [`Value`], [`Graph`], [`ObjectRef`]: the dynamic object model
//! - [`CodecError`]: usage, data and I/O failures

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod key;
pub mod liquifier;
pub mod processor;
pub mod reader;
pub mod registry;
pub mod solidifier;
pub mod value;
pub mod writer;

#[cfg(test)]
mod testing;

pub use cache::{CacheId, CacheKey, CacheMode, Lookup, Preload, ReaderCache, SlotIndex, WriterCache};
pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};
pub use graph::{Graph, Node, ObjectRef};
pub use key::TypeKey;
pub use liquifier::Liquifier;
pub use processor::{mismatch, require_cache, ObjectProcessor};
pub use reader::{Framing, Header, ObjectReader};
pub use registry::{Registered, Registry};
pub use solidifier::Solidifier;
pub use value::{BoxedArray, PrimitiveArray, Scalar, ScalarKind, Value};
pub use writer::{ObjectWriter, NEW_OBJECT_MARKER};
