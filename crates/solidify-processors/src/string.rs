use solidify_core::{
    mismatch, require_cache, CacheId, CacheKey, CacheMode, CodecResult, Framing, Graph, Header,
    ObjectProcessor, ObjectReader, ObjectWriter, Preload, TypeKey, Value,
};

use crate::keys;

/// UTF-8 strings, deduplicated by value.
///
/// The body is the raw UTF-8 bytes; the length travels in the cache header.
/// Null and `""` are preloaded at indices 0 and 1.
#[derive(Debug)]
pub struct StringProcessor {
    key: TypeKey,
}

impl StringProcessor {
    pub fn new() -> Self {
        Self { key: keys::STRING }
    }
}

impl Default for StringProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectProcessor for StringProcessor {
    fn type_key(&self) -> &TypeKey {
        &self.key
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
            other => Err(mismatch(&self.key, "string", other)),
        }
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let cache = require_cache(&self.key, cache)?;
        let key = self.cache_key(out.graph(), value)?;
        let text = value.as_str().unwrap_or_default();
        if out.write_header(cache, key, Some(text.len()))? {
            out.write_utf8(text)?;
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&self.key, cache)?;
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
