//! Minimal processors for exercising the engine without the built-in set.

use std::sync::Arc;

use crate::cache::{CacheId, CacheKey, CacheMode, Preload};
use crate::error::CodecResult;
use crate::graph::{Graph, Node};
use crate::key::TypeKey;
use crate::processor::{mismatch, require_cache, ObjectProcessor};
use crate::reader::{Framing, Header, ObjectReader};
use crate::value::Value;
use crate::writer::ObjectWriter;

pub const TEXT: TypeKey = TypeKey::from_static("text");
pub const LINK: TypeKey = TypeKey::from_static("link");

/// UTF-8 strings, equality cached.
pub struct Text(TypeKey);

impl ObjectProcessor for Text {
    fn type_key(&self) -> &TypeKey {
        &self.0
    }

    fn cache_mode(&self) -> CacheMode {
        CacheMode::EqualityCache
    }

    fn preload(&self) -> &[Preload] {
        &[Preload::Null, Preload::Empty]
    }

    fn empty_value(&self, _graph: &mut Graph) -> CodecResult<Value> {
        Ok(Value::from(""))
    }

    fn cache_key(&self, _graph: &Graph, value: &Value) -> CodecResult<CacheKey> {
        match value {
            Value::Null => Ok(CacheKey::Null),
            Value::Str(s) if s.is_empty() => Ok(CacheKey::Empty),
            Value::Str(_) => Ok(CacheKey::Value(value.clone())),
            other => Err(mismatch(&TEXT, "string", other)),
        }
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let cache = require_cache(&TEXT, cache)?;
        let key = self.cache_key(out.graph(), value)?;
        let text = value.as_str().unwrap_or_default();
        if out.write_header(cache, key, Some(text.len()))? {
            out.write_utf8(text)?;
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&TEXT, cache)?;
        match input.read_header(cache, Framing::Length)? {
            Header::Cached(value) => Ok(value),
            Header::New { slot, length } => {
                let value = Value::from(input.read_utf8(length)?);
                input.fill_slot(cache, slot, value.clone())?;
                Ok(value)
            }
        }
    }
}

/// Identity-cached object with a label and a link to another `link`.
pub struct Link(TypeKey);

impl ObjectProcessor for Link {
    fn type_key(&self) -> &TypeKey {
        &self.0
    }

    fn cache_mode(&self) -> CacheMode {
        CacheMode::IdentityCache
    }

    fn preload(&self) -> &[Preload] {
        &[Preload::Null]
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let cache = require_cache(&LINK, cache)?;
        let node = match value {
            Value::Null => None,
            Value::Ref(obj) => Some(out.node(*obj)?),
            other => return Err(mismatch(&LINK, "object", other)),
        };
        let key = self.cache_key(out.graph(), value)?;
        if out.write_header(cache, key, None)? {
            if let Some(node) = node {
                out.write_object(&TEXT, &node.items[0])?;
                out.write_object(&LINK, &node.items[1])?;
            }
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&LINK, cache)?;
        match input.read_header(cache, Framing::Marker)? {
            Header::Cached(value) => Ok(value),
            Header::New { slot, .. } => {
                let obj = input.reserve_node(cache, slot)?;
                let label = input.read_object(&TEXT)?;
                let next = input.read_object(&LINK)?;
                input.complete_node(obj, Node::new(LINK, vec![label, next]))?;
                Ok(Value::Ref(obj))
            }
        }
    }
}

pub fn processors() -> Vec<Arc<dyn ObjectProcessor>> {
    vec![Arc::new(Text(TEXT)) as Arc<dyn ObjectProcessor>, Arc::new(Link(LINK))]
}
