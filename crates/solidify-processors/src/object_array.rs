//! Arrays of objects.
//!
//! An object array is itself an object: a graph node whose type is the
//! array key and whose items are the elements. It is identity cached with
//! `[null, empty]` preloaded, so every empty array of one type decodes to
//! the same node. Each element goes through the element type's processor
//! and cache.

use solidify_core::{
    mismatch, require_cache, CacheId, CacheKey, CacheMode, CodecError, CodecResult, Framing,
    Graph, Header, Node, ObjectProcessor, ObjectReader, ObjectWriter, Preload, TypeKey, Value,
};

use crate::keys;

#[derive(Debug)]
pub struct ObjectArrayProcessor {
    key: TypeKey,
    element: TypeKey,
}

impl ObjectArrayProcessor {
    /// Array of `element` under the conventional key `[element]`.
    pub fn new(element: TypeKey) -> Self {
        Self::with_key(keys::object_array(&element), element)
    }

    pub fn with_key(key: TypeKey, element: TypeKey) -> Self {
        Self { key, element }
    }

    pub fn element(&self) -> &TypeKey {
        &self.element
    }

    fn node<'g>(&self, graph: &'g Graph, value: &Value) -> CodecResult<Option<&'g Node>> {
        let obj = match value {
            Value::Null => return Ok(None),
            Value::Ref(obj) => *obj,
            other => return Err(mismatch(&self.key, "object", other)),
        };
        let node = graph.node(obj)?;
        if node.ty != self.key {
            return Err(CodecError::InvalidArgument(format!(
                "object {obj} is a {}, not a {}",
                node.ty, self.key
            )));
        }
        Ok(Some(node))
    }
}

impl ObjectProcessor for ObjectArrayProcessor {
    fn type_key(&self) -> &TypeKey {
        &self.key
    }

    fn cache_mode(&self) -> CacheMode {
        CacheMode::IdentityCache
    }

    fn preload(&self) -> &[Preload] {
        &[Preload::Null, Preload::Empty]
    }

    fn empty_value(&self, graph: &mut Graph) -> CodecResult<Value> {
        Ok(Value::Ref(graph.insert(Node::new(self.key.clone(), Vec::new()))))
    }

    fn cache_key(&self, graph: &Graph, value: &Value) -> CodecResult<CacheKey> {
        Ok(match self.node(graph, value)? {
            None => CacheKey::Null,
            Some(node) if node.items.is_empty() => CacheKey::Empty,
            Some(_) => CacheKey::Value(value.clone()),
        })
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let cache = require_cache(&self.key, cache)?;
        let graph = out.graph();
        let key = self.cache_key(graph, value)?;
        let node = self.node(graph, value)?;
        let length = node.map(|n| n.items.len());
        if out.write_header(cache, key, length)? {
            if let Some(node) = node {
                out.write_objects(&self.element, &node.items)?;
            }
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&self.key, cache)?;
        match input.read_header(cache, Framing::Length)? {
            Header::Cached(value) => Ok(value),
            Header::New { slot, length } => {
                let obj = input.reserve_node(cache, slot)?;
                let items = input.read_objects(&self.element, length)?;
                input.complete_node(obj, Node::new(self.key.clone(), items))?;
                Ok(Value::Ref(obj))
            }
        }
    }
}
