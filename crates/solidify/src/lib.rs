//! Compact binary codec for typed object graphs.
//!
//! Values are written ("liquified") and read back ("solidified") against a
//! closed [`Registry`] of processors that both sides agree on ahead of time.
//! Nothing about types is written to the stream. Shared objects are written
//! once and referenced afterwards, and cycles round-trip.
//!
//! ```
//! use solidify::{from_slice, keys, standard_registry, to_vec, Graph, Value};
//!
//! let registry = standard_registry([])?;
//! let bytes = to_vec(&registry, &Graph::new(), &keys::STRING, &Value::from("hello"))?;
//! let (value, _graph) = from_slice(&registry, &bytes, &keys::STRING)?;
//! assert_eq!(value, Value::from("hello"));
//! # Ok::<(), solidify::CodecError>(())
//! ```
//!
//! For streams carrying more than one value, or to tune limits, use
//! [`Liquifier`] and [`Solidifier`] directly.

pub use solidify_core::{
    BoxedArray, CacheMode, CodecConfig, CodecError, CodecResult, Graph, Liquifier, Node,
    ObjectProcessor, ObjectReader, ObjectRef, ObjectWriter, PrimitiveArray, Registry, Scalar,
    ScalarKind, Solidifier, TypeKey, Value,
};
pub use solidify_processors::{
    keys, standard, standard_registry, BoxedArrayProcessor, BoxedScalarProcessor, EnumDef,
    EnumProcessor, ObjectArrayProcessor, PrimitiveArrayProcessor, RecordDef, RecordProcessor,
    StringProcessor,
};

/// Processor building blocks: cache protocol types and helpers for writing
/// custom [`ObjectProcessor`]s.
pub mod processor {
    pub use solidify_core::{
        mismatch, require_cache, CacheId, CacheKey, Framing, Header, Preload, SlotIndex,
        NEW_OBJECT_MARKER,
    };
}

/// Byte-level primitives.
pub mod wire {
    pub use solidify_wire::*;
}

/// Liquify one value into a fresh buffer.
///
/// Handles in `value` resolve against `graph`.
pub fn to_vec(registry: &Registry, graph: &Graph, ty: &TypeKey, value: &Value) -> CodecResult<Vec<u8>> {
    let config = CodecConfig::default();
    let mut caches = registry.writer_caches();
    let mut bytes = Vec::new();
    ObjectWriter::new(&mut bytes, registry, &mut caches, graph, &config).write_object(ty, value)?;
    Ok(bytes)
}

/// Solidify the single value of type `ty` that makes up `bytes`.
///
/// Returns the value together with the graph its handles resolve against.
/// Bytes left over after the value are an error.
pub fn from_slice(registry: &Registry, bytes: &[u8], ty: &TypeKey) -> CodecResult<(Value, Graph)> {
    let mut solidifier = Solidifier::with_registry(registry.clone(), bytes)?;
    let value = solidifier.solidify(ty)?;
    let consumed = solidifier.bytes_read();
    if consumed != bytes.len() as u64 {
        return Err(CodecError::InvalidData(format!(
            "{} trailing bytes after {ty}",
            bytes.len() as u64 - consumed
        )));
    }
    Ok((value, solidifier.into_graph()))
}
