//! The per-type processor interface.

use crate::cache::{CacheId, CacheKey, CacheMode, Preload};
use crate::error::{CodecError, CodecResult};
use crate::graph::Graph;
use crate::key::TypeKey;
use crate::reader::ObjectReader;
use crate::value::Value;
use crate::writer::ObjectWriter;

/// Encode and decode logic for one registered type.
///
/// The registry gives each cached type its own cache and passes its
/// [`CacheId`] to [`liquify`](Self::liquify) and
/// [`solidify`](Self::solidify); `NoCache` types receive `None`. Cached
/// processors frame their bodies with [`ObjectWriter::write_header`] and
/// [`ObjectReader::read_header`].
pub trait ObjectProcessor: Send + Sync {
    fn type_key(&self) -> &TypeKey;

    fn cache_mode(&self) -> CacheMode;

    /// Entries pre-registered, in order, into every fresh cache of this type.
    fn preload(&self) -> &[Preload] {
        &[]
    }

    /// Materialise [`Preload::Empty`] on the reading side.
    fn empty_value(&self, _graph: &mut Graph) -> CodecResult<Value> {
        Err(CodecError::InvalidArgument(format!(
            "type {} has no empty value",
            self.type_key()
        )))
    }

    /// Writer-side cache key for `value`. Null and empty values map to the
    /// preload keys.
    fn cache_key(&self, _graph: &Graph, value: &Value) -> CodecResult<CacheKey> {
        Ok(match value {
            Value::Null => CacheKey::Null,
            other => CacheKey::Value(other.clone()),
        })
    }

    fn liquify(
        &self,
        out: &mut ObjectWriter<'_>,
        cache: Option<CacheId>,
        value: &Value,
    ) -> CodecResult<()>;

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value>;
}

/// The cache handed to a processor, or `MissingCache` if its type has none.
pub fn require_cache(ty: &TypeKey, cache: Option<CacheId>) -> CodecResult<CacheId> {
    cache.ok_or_else(|| CodecError::MissingCache(ty.clone()))
}

/// A `TypeMismatch` for `found` handed to the processor of `ty`.
pub fn mismatch(ty: &TypeKey, expected: &'static str, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        ty: ty.clone(),
        expected,
        found: found.kind_name(),
    }
}
