//! Arrays of primitive scalars.
//!
//! Equality cached with `[null, empty]` preloaded. The body is a raw
//! little-endian run of the elements; booleans are bit-packed.

use solidify_core::{
    mismatch, require_cache, CacheId, CacheKey, CacheMode, CodecResult, Framing, Graph, Header,
    ObjectProcessor, ObjectReader, ObjectWriter, Preload, PrimitiveArray, ScalarKind, TypeKey, Value,
};

use crate::keys;

#[derive(Debug)]
pub struct PrimitiveArrayProcessor {
    key: TypeKey,
    kind: ScalarKind,
}

impl PrimitiveArrayProcessor {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            key: keys::primitive_array(kind),
            kind,
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    fn array<'v>(&self, value: &'v Value) -> CodecResult<Option<&'v PrimitiveArray>> {
        match value {
            Value::Null => Ok(None),
            Value::Primitives(array) if array.kind() == self.kind => Ok(Some(&**array)),
            other => Err(mismatch(&self.key, keys::primitive_array_name(self.kind), other)),
        }
    }
}

impl ObjectProcessor for PrimitiveArrayProcessor {
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
        Ok(Value::from(PrimitiveArray::empty(self.kind)))
    }

    fn cache_key(&self, _graph: &Graph, value: &Value) -> CodecResult<CacheKey> {
        Ok(match self.array(value)? {
            None => CacheKey::Null,
            Some(array) if array.is_empty() => CacheKey::Empty,
            Some(_) => CacheKey::Value(value.clone()),
        })
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let cache = require_cache(&self.key, cache)?;
        let key = self.cache_key(out.graph(), value)?;
        let Some(array) = self.array(value)? else {
            out.write_header(cache, key, None)?;
            return Ok(());
        };
        if !out.write_header(cache, key, Some(array.len()))? {
            return Ok(());
        }
        match array {
            PrimitiveArray::Bool(v) => out.write_bools(v)?,
            PrimitiveArray::Byte(v) => out.write_bytes(v)?,
            PrimitiveArray::Short(v) => out.write_i16s(v)?,
            PrimitiveArray::Int(v) => out.write_i32s(v)?,
            PrimitiveArray::Long(v) => out.write_i64s(v)?,
            PrimitiveArray::Float(v) => out.write_f32s(v)?,
            PrimitiveArray::Double(v) => out.write_f64s(v)?,
            PrimitiveArray::Char(v) => out.write_chars(v)?,
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&self.key, cache)?;
        let (slot, len) = match input.read_header(cache, Framing::Length)? {
            Header::Cached(value) => return Ok(value),
            Header::New { slot, length } => (slot, length),
        };
        let array = match self.kind {
            ScalarKind::Bool => PrimitiveArray::Bool(input.read_bools(len)?),
            ScalarKind::Byte => PrimitiveArray::Byte(input.read_bytes(len)?),
            ScalarKind::Short => PrimitiveArray::Short(input.read_i16s(len)?),
            ScalarKind::Int => PrimitiveArray::Int(input.read_i32s(len)?),
            ScalarKind::Long => PrimitiveArray::Long(input.read_i64s(len)?),
            ScalarKind::Float => PrimitiveArray::Float(input.read_f32s(len)?),
            ScalarKind::Double => PrimitiveArray::Double(input.read_f64s(len)?),
            ScalarKind::Char => PrimitiveArray::Char(input.read_chars(len)?),
        };
        let value = Value::from(array);
        input.fill_slot(cache, slot, value.clone())?;
        Ok(value)
    }
}
