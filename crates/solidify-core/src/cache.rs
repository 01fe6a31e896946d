//! Per-type object caches.
//!
//! Every cached type owns one cache per session on each side of the stream.
//! The writer maps values to indices; the reader keeps an append-only table
//! of slots. Both start with the same preload entries at the same indices and
//! assign new indices in encounter order, so an index means the same object
//! on both sides.
//!
//! A reader slot is allocated before the object's body is decoded and filled
//! afterwards. Identity-cached objects fill their slot with the node handle
//! as soon as the node is reserved, which lets a body refer to the object
//! that contains it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// How a type's values are deduplicated within a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheMode {
    /// Every occurrence is encoded inline.
    NoCache,
    /// Occurrences of the same object (same handle) are encoded once.
    IdentityCache,
    /// Equal values are encoded once.
    EqualityCache,
}

impl CacheMode {
    pub fn is_cached(self) -> bool {
        !matches!(self, Self::NoCache)
    }
}

/// Sentinel entries present in every fresh cache, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preload {
    Null,
    /// The type's empty value (empty string or zero-length array).
    Empty,
}

/// Writer-side cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Null,
    Empty,
    /// An equality-cached value, or `Value::Ref` for identity-cached objects.
    Value(Value),
}

impl From<Preload> for CacheKey {
    fn from(p: Preload) -> Self {
        match p {
            Preload::Null => Self::Null,
            Preload::Empty => Self::Empty,
        }
    }
}

/// Index of one type's cache within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(pub(crate) usize);

impl CacheId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a reader cache slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Result of [`WriterCache::put_if_absent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Already cached at this index; emit a back-reference.
    Hit(usize),
    /// Newly assigned this index; emit the full body.
    Miss(usize),
}

/// Value-to-index map used while liquifying.
#[derive(Clone, Debug)]
pub struct WriterCache {
    mode: CacheMode,
    indices: HashMap<CacheKey, usize>,
}

impl WriterCache {
    pub fn new(mode: CacheMode, preload: &[Preload]) -> Self {
        let mut cache = Self {
            mode,
            indices: HashMap::with_capacity(preload.len()),
        };
        for &entry in preload {
            cache.put_if_absent(entry.into());
        }
        cache
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn index_of(&self, key: &CacheKey) -> Option<usize> {
        self.indices.get(key).copied()
    }

    /// Return the existing index for `key`, or record it at the next index.
    pub fn put_if_absent(&mut self, key: CacheKey) -> Lookup {
        let next = self.indices.len();
        match self.indices.get(&key) {
            Some(&index) => Lookup::Hit(index),
            None => {
                self.indices.insert(key, next);
                Lookup::Miss(next)
            }
        }
    }
}

/// Slot table used while solidifying.
#[derive(Clone, Debug)]
pub struct ReaderCache {
    mode: CacheMode,
    slots: Vec<Option<Value>>,
    seen: HashSet<Value>,
}

impl ReaderCache {
    /// A cache whose first slots hold the already materialised preload values.
    pub fn new(mode: CacheMode, preload: Vec<Value>) -> Self {
        let seen = match mode {
            CacheMode::EqualityCache => preload.iter().cloned().collect(),
            _ => HashSet::new(),
        };
        Self {
            mode,
            slots: preload.into_iter().map(Some).collect(),
            seen,
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reserve the next slot.
    pub fn alloc(&mut self) -> SlotIndex {
        self.slots.push(None);
        SlotIndex(self.slots.len() - 1)
    }

    /// Complete a reserved slot. A slot is filled once and never changes.
    ///
    /// An equality cache also refuses a new value equal to one it already
    /// holds: a conforming writer would have sent a back-reference.
    pub fn fill(&mut self, slot: SlotIndex, value: Value) -> CodecResult<()> {
        let entry = self
            .slots
            .get_mut(slot.0)
            .ok_or_else(|| CodecError::invalid(format!("cache slot {} was never allocated", slot.0)))?;
        if entry.is_some() {
            return Err(CodecError::invalid(format!("cache slot {} filled twice", slot.0)));
        }
        if self.mode == CacheMode::EqualityCache && !self.seen.insert(value.clone()) {
            return Err(CodecError::invalid(format!(
                "cache slot {} duplicates an earlier {}",
                slot.0,
                value.kind_name()
            )));
        }
        *entry = Some(value);
        Ok(())
    }

    /// The value behind a back-reference. The returned value shares its
    /// payload with the slot.
    pub fn get(&self, index: usize) -> CodecResult<Value> {
        match self.slots.get(index) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(CodecError::invalid(format!(
                "cache index {index} referenced before its object was decoded"
            ))),
            None => Err(CodecError::invalid(format!(
                "cache index {index} out of range ({} slots)",
                self.slots.len()
            ))),
        }
    }
}
