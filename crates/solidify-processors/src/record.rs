//! Records: objects with a fixed, ordered list of typed fields.
//!
//! Identity cached with `[null]` preloaded. A new record is announced by
//! the `-1` marker and followed by each field, written by that field's own
//! processor. The record's node is reserved before its fields are read, so
//! a field may refer back to the record that contains it.

use serde::{Deserialize, Serialize};
use solidify_core::{
    mismatch, require_cache, CacheId, CacheMode, CodecError, CodecResult, Framing, Graph, Header,
    Node, ObjectProcessor, ObjectReader, ObjectWriter, Preload, TypeKey, Value,
};

/// Declarative form of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDef {
    pub name: TypeKey,
    pub fields: Vec<TypeKey>,
}

#[derive(Debug, Clone)]
pub struct RecordProcessor {
    key: TypeKey,
    fields: Vec<TypeKey>,
}

impl RecordProcessor {
    pub fn new(key: impl Into<TypeKey>, fields: impl IntoIterator<Item = TypeKey>) -> Self {
        Self {
            key: key.into(),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> &[TypeKey] {
        &self.fields
    }

    /// Build a record node in `graph` and return its handle.
    pub fn insert(&self, graph: &mut Graph, items: Vec<Value>) -> CodecResult<Value> {
        let node = Node::new(self.key.clone(), items);
        self.check(&node)?;
        Ok(Value::Ref(graph.insert(node)))
    }

    fn check(&self, node: &Node) -> CodecResult<()> {
        if node.ty != self.key {
            return Err(CodecError::InvalidArgument(format!(
                "object is a {}, not a {}",
                node.ty, self.key
            )));
        }
        if node.items.len() != self.fields.len() {
            return Err(CodecError::InvalidArgument(format!(
                "record {} has {} fields, got {}",
                self.key,
                self.fields.len(),
                node.items.len()
            )));
        }
        Ok(())
    }
}

impl From<RecordDef> for RecordProcessor {
    fn from(def: RecordDef) -> Self {
        Self::new(def.name, def.fields)
    }
}

impl ObjectProcessor for RecordProcessor {
    fn type_key(&self) -> &TypeKey {
        &self.key
    }

    fn cache_mode(&self) -> CacheMode {
        CacheMode::IdentityCache
    }

    fn preload(&self) -> &[Preload] {
        &[Preload::Null]
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let cache = require_cache(&self.key, cache)?;
        let node = match value {
            Value::Null => None,
            Value::Ref(obj) => {
                let node = out.node(*obj)?;
                self.check(node)?;
                Some(node)
            }
            other => return Err(mismatch(&self.key, "object", other)),
        };
        let key = self.cache_key(out.graph(), value)?;
        if !out.write_header(cache, key, None)? {
            return Ok(());
        }
        if let Some(node) = node {
            for (ty, item) in self.fields.iter().zip(&node.items) {
                out.write_object(ty, item)?;
            }
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&self.key, cache)?;
        let slot = match input.read_header(cache, Framing::Marker)? {
            Header::Cached(value) => return Ok(value),
            Header::New { slot, .. } => slot,
        };
        let obj = input.reserve_node(cache, slot)?;
        let mut items = Vec::with_capacity(self.fields.len());
        for ty in &self.fields {
            items.push(input.read_object(ty)?);
        }
        input.complete_node(obj, Node::new(self.key.clone(), items))?;
        Ok(Value::Ref(obj))
    }
}
