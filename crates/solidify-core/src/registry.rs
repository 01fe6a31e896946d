//! Type key to processor table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheId, Preload, ReaderCache, WriterCache};
use crate::error::{CodecError, CodecResult};
use crate::graph::Graph;
use crate::key::TypeKey;
use crate::processor::ObjectProcessor;
use crate::value::Value;

/// A processor together with the session cache assigned to its type.
#[derive(Clone)]
pub struct Registered {
    processor: Arc<dyn ObjectProcessor>,
    cache: Option<CacheId>,
}

impl Registered {
    pub fn processor(&self) -> &dyn ObjectProcessor {
        self.processor.as_ref()
    }

    /// `None` for `NoCache` types.
    pub fn cache(&self) -> Option<CacheId> {
        self.cache
    }
}

/// The closed set of types a liquifier or solidifier understands.
///
/// Built explicitly from the processors the caller supplies. Cloning is
/// cheap; one registry can seed any number of independent sessions.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<TypeKey, Registered>,
    /// Owner of each cache, indexed by `CacheId`.
    caches: Vec<TypeKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every processor in order.
    pub fn from_processors(
        processors: impl IntoIterator<Item = Arc<dyn ObjectProcessor>>,
    ) -> CodecResult<Self> {
        let mut registry = Self::new();
        for processor in processors {
            registry.register(processor)?;
        }
        Ok(registry)
    }

    /// Add a processor. Cached types are assigned the next cache id.
    pub fn register(&mut self, processor: Arc<dyn ObjectProcessor>) -> CodecResult<()> {
        let key = processor.type_key().clone();
        if self.entries.contains_key(&key) {
            return Err(CodecError::DuplicateRegistration(key));
        }
        let mode = processor.cache_mode();
        let cache = mode.is_cached().then(|| {
            self.caches.push(key.clone());
            CacheId(self.caches.len() - 1)
        });
        debug!(ty = %key, ?mode, "registered processor");
        self.entries.insert(key, Registered { processor, cache });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.entries.contains_key(ty)
    }

    /// Number of per-session caches each session allocates.
    pub fn cache_count(&self) -> usize {
        self.caches.len()
    }

    pub fn lookup(&self, ty: &TypeKey) -> CodecResult<&Registered> {
        self.entries
            .get(ty)
            .ok_or_else(|| CodecError::UnregisteredType(ty.clone()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.keys()
    }

    fn cache_owners(&self) -> impl Iterator<Item = &Registered> + '_ {
        // Every cache owner is registered by construction.
        self.caches.iter().filter_map(|key| self.entries.get(key))
    }

    /// Fresh writer caches for one session, preloaded.
    pub fn writer_caches(&self) -> Vec<WriterCache> {
        self.cache_owners()
            .map(|entry| {
                let p = entry.processor();
                WriterCache::new(p.cache_mode(), p.preload())
            })
            .collect()
    }

    /// Fresh reader caches for one session. Empty preload values that are
    /// objects are created in `graph`.
    pub fn reader_caches(&self, graph: &mut Graph) -> CodecResult<Vec<ReaderCache>> {
        self.cache_owners()
            .map(|entry| {
                let p = entry.processor();
                let preload = p
                    .preload()
                    .iter()
                    .map(|entry| match entry {
                        Preload::Null => Ok(Value::Null),
                        Preload::Empty => p.empty_value(graph),
                    })
                    .collect::<CodecResult<Vec<_>>>()?;
                Ok(ReaderCache::new(p.cache_mode(), preload))
            })
            .collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().map(TypeKey::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Registry")
            .field("types", &keys)
            .field("caches", &self.caches.len())
            .finish()
    }
}
