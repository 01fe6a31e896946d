//! Arrays of nullable scalars.
//!
//! Equality cached with `[null, empty]` preloaded. The body is a bit-packed
//! presence mask, one bit per element, followed by the present elements
//! only. Present booleans form a second bit vector; every other kind is a
//! dense run of raw little-endian values.

use solidify_core::{
    mismatch, require_cache, BoxedArray, CacheId, CacheKey, CacheMode, CodecError, CodecResult,
    Framing, Graph, Header, ObjectProcessor, ObjectReader, ObjectWriter, Preload, Scalar,
    ScalarKind, TypeKey, Value,
};

use crate::keys;
use crate::scalar::{read_raw, write_raw};

#[derive(Debug)]
pub struct BoxedArrayProcessor {
    key: TypeKey,
    kind: ScalarKind,
}

impl BoxedArrayProcessor {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            key: keys::boxed_array(kind),
            kind,
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    fn array<'v>(&self, value: &'v Value) -> CodecResult<Option<&'v BoxedArray>> {
        match value {
            Value::Null => Ok(None),
            Value::Boxed(array) if array.kind == self.kind => Ok(Some(&**array)),
            other => Err(mismatch(&self.key, keys::boxed_array_name(self.kind), other)),
        }
    }

    fn write_body(&self, out: &mut ObjectWriter<'_>, array: &BoxedArray) -> CodecResult<()> {
        let mask: Vec<bool> = array.items.iter().map(Option::is_some).collect();
        out.write_bools(&mask)?;

        let present = array.items.iter().flatten().copied();
        if self.kind == ScalarKind::Bool {
            let bits = present
                .map(|s| match s {
                    Scalar::Bool(b) => Ok(b),
                    other => Err(self.element_mismatch(other)),
                })
                .collect::<CodecResult<Vec<bool>>>()?;
            out.write_bools(&bits)?;
            return Ok(());
        }
        for scalar in present {
            if scalar.kind() != self.kind {
                return Err(self.element_mismatch(scalar));
            }
            write_raw(out, scalar)?;
        }
        Ok(())
    }

    fn read_body(&self, input: &mut ObjectReader<'_>, len: usize) -> CodecResult<BoxedArray> {
        let mask = input.read_bools(len)?;
        let count = mask.iter().filter(|&&present| present).count();
        let values: Vec<Scalar> = if self.kind == ScalarKind::Bool {
            input.read_bools(count)?.into_iter().map(Scalar::Bool).collect()
        } else {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(read_raw(input, self.kind)?);
            }
            values
        };
        let mut present = values.into_iter();
        let items = mask
            .into_iter()
            .map(|bit| if bit { present.next() } else { None })
            .collect();
        Ok(BoxedArray::new(self.kind, items))
    }

    fn element_mismatch(&self, found: Scalar) -> CodecError {
        CodecError::TypeMismatch {
            ty: self.key.clone(),
            expected: self.kind.name(),
            found: found.kind().name(),
        }
    }
}

impl ObjectProcessor for BoxedArrayProcessor {
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
        Ok(Value::from(BoxedArray::empty(self.kind)))
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
        let array = self.array(value)?;
        let length = array.map(BoxedArray::len);
        if out.write_header(cache, key, length)? {
            if let Some(array) = array {
                self.write_body(out, array)?;
            }
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, cache: Option<CacheId>) -> CodecResult<Value> {
        let cache = require_cache(&self.key, cache)?;
        match input.read_header(cache, Framing::Length)? {
            Header::Cached(value) => Ok(value),
            Header::New { slot, length } => {
                let value = Value::from(self.read_body(input, length)?);
                input.fill_slot(cache, slot, value.clone())?;
                Ok(value)
            }
        }
    }
}
