//! Liquify-side session context handed to processors.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use solidify_wire::{WireWriter, PACKED_I32_MIN};

use crate::cache::{CacheId, CacheKey, WriterCache};
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::graph::{Graph, Node, ObjectRef};
use crate::key::TypeKey;
use crate::registry::Registry;
use crate::value::Value;

/// Header marker announcing a new object of a type without a length.
pub const NEW_OBJECT_MARKER: i32 = -1;

/// Lengths below this fit in a single header word.
pub(crate) const SHORT_LENGTH_LIMIT: usize = 0x8000;

/// Everything a processor needs while writing one top-level value: the
/// stream, the registry for nested values, this session's caches, and the
/// graph that object handles point into.
///
/// Dereferences to the underlying [`WireWriter`] for raw primitives.
pub struct ObjectWriter<'a> {
    wire: WireWriter<&'a mut dyn Write>,
    registry: &'a Registry,
    caches: &'a mut [WriterCache],
    graph: &'a Graph,
    config: &'a CodecConfig,
}

impl<'a> ObjectWriter<'a> {
    pub fn new(
        out: &'a mut dyn Write,
        registry: &'a Registry,
        caches: &'a mut [WriterCache],
        graph: &'a Graph,
        config: &'a CodecConfig,
    ) -> Self {
        Self {
            wire: WireWriter::new(out),
            registry,
            caches,
            graph,
            config,
        }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Resolve a handle in the session graph.
    pub fn node(&self, obj: ObjectRef) -> CodecResult<&'a Node> {
        self.graph.node(obj)
    }

    pub fn config(&self) -> &'a CodecConfig {
        self.config
    }

    /// Write `value` with the processor registered for `ty`.
    ///
    /// Nesting is not limited here: the caller's own graph decides how deep
    /// the recursion goes, and every acyclic value must be writable.
    pub fn write_object(&mut self, ty: &TypeKey, value: &Value) -> CodecResult<()> {
        let registry = self.registry;
        let entry = registry.lookup(ty)?;
        entry.processor().liquify(self, entry.cache(), value)
    }

    /// Write each value in order with the processor for `ty`.
    pub fn write_objects<'v>(
        &mut self,
        ty: &TypeKey,
        values: impl IntoIterator<Item = &'v Value>,
    ) -> CodecResult<()> {
        values
            .into_iter()
            .try_for_each(|value| self.write_object(ty, value))
    }

    /// Emit the cache header for `key`.
    ///
    /// A cached key becomes a back-reference and `false` is returned. A new
    /// key is announced by its negated `length`, or by [`NEW_OBJECT_MARKER`]
    /// when `length` is `None`; the caller must then write the body (`true`).
    /// The key is recorded only once its length has been accepted.
    pub fn write_header(
        &mut self,
        cache: CacheId,
        key: CacheKey,
        length: Option<usize>,
    ) -> CodecResult<bool> {
        if let Some(index) = self.cache(cache)?.index_of(&key) {
            let index = i32::try_from(index).map_err(|_| CodecError::TooLarge {
                what: "cache index",
                actual: index as u64,
                limit: i32::MAX as u64,
            })?;
            self.wire.write_packed_i32(index)?;
            return Ok(false);
        }
        let length = length.map(|len| self.check_length(len)).transpose()?;
        self.cache(cache)?.put_if_absent(key);
        match length {
            Some(len) if len < SHORT_LENGTH_LIMIT as i32 => self.wire.write_packed_i32(-len)?,
            Some(len) => {
                self.wire.write_packed_i32(PACKED_I32_MIN)?;
                self.wire.write_packed_i32(len - SHORT_LENGTH_LIMIT as i32)?;
            }
            None => self.wire.write_packed_i32(NEW_OBJECT_MARKER)?,
        }
        Ok(true)
    }

    fn cache(&mut self, cache: CacheId) -> CodecResult<&mut WriterCache> {
        self.caches
            .get_mut(cache.index())
            .ok_or_else(|| CodecError::InvalidArgument(format!("unknown cache {}", cache.index())))
    }

    /// A new object's length must be positive and within both
    /// `max_length` and the i32 header range.
    fn check_length(&self, len: usize) -> CodecResult<i32> {
        if len == 0 {
            return Err(CodecError::InvalidArgument(
                "zero-length objects are written through the empty preload entry".into(),
            ));
        }
        if len > self.config.max_length {
            return Err(CodecError::TooLarge {
                what: "length",
                actual: len as u64,
                limit: self.config.max_length as u64,
            });
        }
        i32::try_from(len).map_err(|_| CodecError::TooLarge {
            what: "length",
            actual: len as u64,
            limit: i32::MAX as u64,
        })
    }
}

impl<'a> Deref for ObjectWriter<'a> {
    type Target = WireWriter<&'a mut dyn Write>;

    fn deref(&self) -> &Self::Target {
        &self.wire
    }
}

impl DerefMut for ObjectWriter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheMode, Preload};

    fn with_writer<T>(
        config: CodecConfig,
        f: impl FnOnce(&mut ObjectWriter<'_>) -> T,
    ) -> (T, Vec<u8>) {
        let registry = Registry::new();
        let graph = Graph::new();
        let mut caches = vec![WriterCache::new(
            CacheMode::EqualityCache,
            &[Preload::Null, Preload::Empty],
        )];
        let mut out = Vec::new();
        let result = {
            let mut w = ObjectWriter::new(&mut out, &registry, &mut caches, &graph, &config);
            f(&mut w)
        };
        (result, out)
    }

    #[test]
    fn preloaded_keys_are_back_references() {
        let (result, bytes) = with_writer(CodecConfig::default(), |w| {
            let a = w.write_header(CacheId(0), CacheKey::Null, Some(0)).unwrap();
            let b = w.write_header(CacheId(0), CacheKey::Empty, Some(0)).unwrap();
            (a, b)
        });
        assert_eq!(result, (false, false));
        assert_eq!(bytes, vec![0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn new_value_carries_negated_length() {
        let key = CacheKey::Value(Value::from("abc"));
        let (result, bytes) = with_writer(CodecConfig::default(), |w| {
            let first = w.write_header(CacheId(0), key.clone(), Some(3)).unwrap();
            let again = w.write_header(CacheId(0), key, Some(3)).unwrap();
            (first, again)
        });
        assert_eq!(result, (true, false));
        // -3 as packed i32, then back-reference 2.
        assert_eq!(bytes, vec![0xFD, 0xFF, 0x00, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn long_lengths_use_extension_word() {
        let (_, bytes) = with_writer(CodecConfig::default(), |w| {
            w.write_header(CacheId(0), CacheKey::Value(Value::Enum(1)), Some(0x8005))
                .unwrap()
        });
        // -0x8000, then 5.
        assert_eq!(bytes, vec![0x00, 0x80, 0x00, 0x00, 0x05, 0x00]);
    }

    #[test]
    fn marker_framing() {
        let (_, bytes) = with_writer(CodecConfig::default(), |w| {
            w.write_header(CacheId(0), CacheKey::Value(Value::Enum(1)), None)
                .unwrap()
        });
        assert_eq!(bytes, vec![0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn zero_length_new_value_is_usage_error() {
        let (err, _) = with_writer(CodecConfig::default(), |w| {
            w.write_header(CacheId(0), CacheKey::Value(Value::from("")), Some(0))
                .unwrap_err()
        });
        assert!(err.is_usage_error());
    }

    #[test]
    fn length_limit_is_enforced() {
        let config = CodecConfig {
            max_length: 4,
            ..Default::default()
        };
        let (err, bytes) = with_writer(config, |w| {
            w.write_header(CacheId(0), CacheKey::Value(Value::from("hello")), Some(5))
                .unwrap_err()
        });
        assert!(matches!(err, CodecError::TooLarge { what: "length", .. }));
        assert!(err.is_usage_error());
        assert!(bytes.is_empty());
    }

    #[test]
    fn rejected_length_leaves_the_key_unrecorded() {
        let config = CodecConfig {
            max_length: 4,
            ..Default::default()
        };
        let long = CacheKey::Value(Value::from("toolong"));
        let (results, bytes) = with_writer(config, |w| {
            let first = w.write_header(CacheId(0), long.clone(), Some(7)).is_err();
            let short = w.write_header(CacheId(0), CacheKey::Value(Value::from("a")), Some(1));
            let again = w.write_header(CacheId(0), long, Some(7)).is_err();
            (first, short.unwrap(), again)
        });
        assert_eq!(results, (true, true, true));
        // Only the short value reached the stream, as -1.
        assert_eq!(bytes, vec![0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn unregistered_nested_type() {
        let (err, _) = with_writer(CodecConfig::default(), |w| {
            w.write_object(&TypeKey::from_static("ghost"), &Value::Null)
                .unwrap_err()
        });
        assert!(matches!(err, CodecError::UnregisteredType(_)));
    }

    #[test]
    fn raw_primitives_through_deref() {
        let (_, bytes) = with_writer(CodecConfig::default(), |w| {
            w.write_u8(7).unwrap();
            w.write_packed_i32(0x8000).unwrap();
            w.position()
        });
        assert_eq!(bytes, vec![0x07, 0x00, 0x80, 0x01, 0x00]);
    }
}
