//! Solidify-side session context handed to processors.

use std::io::Read;
use std::ops::{Deref, DerefMut};

use solidify_wire::{WireReader, PACKED_I32_MIN};

use crate::cache::{CacheId, ReaderCache, SlotIndex};
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::graph::{Graph, Node, ObjectRef};
use crate::key::TypeKey;
use crate::registry::Registry;
use crate::value::Value;
use crate::writer::{NEW_OBJECT_MARKER, SHORT_LENGTH_LIMIT};

/// How a new object announces itself in its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Negated length, with an extension word for long lengths.
    Length,
    /// [`NEW_OBJECT_MARKER`] only.
    Marker,
}

/// A decoded cache header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Header {
    /// Back-reference to a value already in the cache.
    Cached(Value),
    /// A new object. Its slot is already allocated and must be filled once
    /// the body is decoded. `length` is zero under [`Framing::Marker`].
    New { slot: SlotIndex, length: usize },
}

/// Everything a processor needs while reading one top-level value.
///
/// Dereferences to the underlying [`WireReader`] for raw primitives.
pub struct ObjectReader<'a> {
    wire: WireReader<&'a mut dyn Read>,
    registry: &'a Registry,
    caches: &'a mut [ReaderCache],
    graph: &'a mut Graph,
    config: &'a CodecConfig,
    depth: usize,
}

impl<'a> ObjectReader<'a> {
    pub fn new(
        input: &'a mut dyn Read,
        registry: &'a Registry,
        caches: &'a mut [ReaderCache],
        graph: &'a mut Graph,
        config: &'a CodecConfig,
    ) -> Self {
        Self {
            wire: WireReader::new(input),
            registry,
            caches,
            graph,
            config,
            depth: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut *self.graph
    }

    pub fn config(&self) -> &'a CodecConfig {
        self.config
    }

    /// Read one value with the processor registered for `ty`.
    pub fn read_object(&mut self, ty: &TypeKey) -> CodecResult<Value> {
        let registry = self.registry;
        let entry = registry.lookup(ty)?;
        if self.depth >= self.config.max_depth {
            return Err(CodecError::LimitExceeded {
                what: "nesting depth",
                actual: self.depth as u64 + 1,
                limit: self.config.max_depth as u64,
            });
        }
        self.depth += 1;
        let result = entry.processor().solidify(self, entry.cache());
        self.depth -= 1;
        result
    }

    /// Read `count` values of type `ty`.
    pub fn read_objects(&mut self, ty: &TypeKey, count: usize) -> CodecResult<Vec<Value>> {
        // `count` may come from the stream; grow as values actually decode.
        let mut values = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            values.push(self.read_object(ty)?);
        }
        Ok(values)
    }

    fn cache_mut(&mut self, cache: CacheId) -> CodecResult<&mut ReaderCache> {
        self.caches
            .get_mut(cache.index())
            .ok_or_else(|| CodecError::InvalidArgument(format!("unknown cache {}", cache.index())))
    }

    /// Read a cache header.
    ///
    /// For a new object the slot is allocated before the length is decoded,
    /// so the indices of everything nested in the body come after it.
    pub fn read_header(&mut self, cache: CacheId, framing: Framing) -> CodecResult<Header> {
        let marker = self.wire.read_packed_i32()?;
        if let Ok(index) = usize::try_from(marker) {
            return Ok(Header::Cached(self.cache_mut(cache)?.get(index)?));
        }
        let slot = self.cache_mut(cache)?.alloc();
        let length = match framing {
            Framing::Length => self.read_new_length(marker)?,
            Framing::Marker if marker == NEW_OBJECT_MARKER => 0,
            Framing::Marker => {
                return Err(CodecError::invalid(format!(
                    "unexpected object marker {marker}"
                )))
            }
        };
        Ok(Header::New { slot, length })
    }

    fn read_new_length(&mut self, marker: i32) -> CodecResult<usize> {
        let length = if marker == PACKED_I32_MIN {
            let extension = self.wire.read_packed_i32()?;
            let extension = usize::try_from(extension)
                .map_err(|_| CodecError::invalid(format!("negative length extension {extension}")))?;
            let combined = SHORT_LENGTH_LIMIT + extension;
            if i32::try_from(combined).is_err() {
                return Err(CodecError::invalid(format!("length {combined} overflows")));
            }
            combined
        } else {
            marker.unsigned_abs() as usize
        };
        if length > self.config.max_length {
            return Err(CodecError::LimitExceeded {
                what: "length",
                actual: length as u64,
                limit: self.config.max_length as u64,
            });
        }
        Ok(length)
    }

    /// Complete the slot allocated by [`read_header`](Self::read_header).
    pub fn fill_slot(&mut self, cache: CacheId, slot: SlotIndex, value: Value) -> CodecResult<()> {
        self.cache_mut(cache)?.fill(slot, value)
    }

    /// Reserve a graph node for an identity-cached object and put its handle
    /// in `slot` right away, before the body is read.
    pub fn reserve_node(&mut self, cache: CacheId, slot: SlotIndex) -> CodecResult<ObjectRef> {
        let obj = self.graph.reserve();
        self.fill_slot(cache, slot, Value::Ref(obj))?;
        Ok(obj)
    }

    /// Fill a node reserved with [`reserve_node`](Self::reserve_node).
    pub fn complete_node(&mut self, obj: ObjectRef, node: Node) -> CodecResult<()> {
        self.graph.fill(obj, node)
    }
}

impl<'a> Deref for ObjectReader<'a> {
    type Target = WireReader<&'a mut dyn Read>;

    fn deref(&self) -> &Self::Target {
        &self.wire
    }
}

impl DerefMut for ObjectReader<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.wire
    }
}
