//! Nullable scalars.
//!
//! Not cached: a presence byte (`0x80` present, `0x00` absent) followed by
//! the raw little-endian value. Booleans fold presence into one byte
//! (`0x00` false, `0x80` true, `0xFF` null). Floats and doubles use the
//! packed nullable encoding, whose null is a reserved NaN pattern.

use solidify_core::{
    mismatch, CacheId, CacheMode, CodecError, CodecResult, ObjectProcessor, ObjectReader,
    ObjectWriter, Scalar, ScalarKind, TypeKey, Value,
};
use solidify_wire::{FALSE_BYTE, TRUE_BYTE};

use crate::keys;

/// Boolean byte meaning null.
pub const BOOL_NULL: u8 = 0xFF;

/// Write the raw encoding of one scalar.
pub(crate) fn write_raw(out: &mut ObjectWriter<'_>, value: Scalar) -> CodecResult<()> {
    match value {
        Scalar::Bool(v) => out.write_bool(v)?,
        Scalar::Byte(v) => out.write_u8(v)?,
        Scalar::Short(v) => out.write_i16(v)?,
        Scalar::Int(v) => out.write_i32(v)?,
        Scalar::Long(v) => out.write_i64(v)?,
        Scalar::Float(v) => out.write_f32(v)?,
        Scalar::Double(v) => out.write_f64(v)?,
        Scalar::Char(v) => out.write_char(v)?,
    }
    Ok(())
}

/// Read the raw encoding of one scalar of `kind`.
pub(crate) fn read_raw(input: &mut ObjectReader<'_>, kind: ScalarKind) -> CodecResult<Scalar> {
    Ok(match kind {
        ScalarKind::Bool => Scalar::Bool(input.read_bool()?),
        ScalarKind::Byte => Scalar::Byte(input.read_u8()?),
        ScalarKind::Short => Scalar::Short(input.read_i16()?),
        ScalarKind::Int => Scalar::Int(input.read_i32()?),
        ScalarKind::Long => Scalar::Long(input.read_i64()?),
        ScalarKind::Float => Scalar::Float(input.read_f32()?),
        ScalarKind::Double => Scalar::Double(input.read_f64()?),
        ScalarKind::Char => Scalar::Char(input.read_char()?),
    })
}

/// Processor for one nullable scalar kind, keyed [`keys::boxed`].
#[derive(Debug)]
pub struct BoxedScalarProcessor {
    key: TypeKey,
    kind: ScalarKind,
}

impl BoxedScalarProcessor {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            key: keys::boxed(kind),
            kind,
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }
}

impl ObjectProcessor for BoxedScalarProcessor {
    fn type_key(&self) -> &TypeKey {
        &self.key
    }

    fn cache_mode(&self) -> CacheMode {
        CacheMode::NoCache
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, _cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let scalar = match value {
            Value::Null => None,
            Value::Scalar(s) if s.kind() == self.kind => Some(*s),
            other => return Err(mismatch(&self.key, self.kind.name(), other)),
        };
        match (self.kind, scalar) {
            (ScalarKind::Bool, None) => out.write_u8(BOOL_NULL)?,
            (ScalarKind::Float, None) => out.write_packed_f32_opt(None)?,
            (ScalarKind::Double, None) => out.write_packed_f64_opt(None)?,
            (_, None) => out.write_bool(false)?,
            (_, Some(Scalar::Bool(v))) => out.write_bool(v)?,
            (_, Some(Scalar::Float(v))) => out.write_packed_f32(v)?,
            (_, Some(Scalar::Double(v))) => out.write_packed_f64(v)?,
            (_, Some(s)) => {
                out.write_bool(true)?;
                write_raw(out, s)?;
            }
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, _cache: Option<CacheId>) -> CodecResult<Value> {
        let scalar = match self.kind {
            ScalarKind::Bool => match input.read_u8()? {
                FALSE_BYTE => Some(Scalar::Bool(false)),
                TRUE_BYTE => Some(Scalar::Bool(true)),
                BOOL_NULL => None,
                other => {
                    return Err(CodecError::InvalidData(format!(
                        "invalid nullable boolean byte {other:#04x}"
                    )))
                }
            },
            ScalarKind::Float => input.read_packed_f32_opt()?.map(Scalar::Float),
            ScalarKind::Double => input.read_packed_f64_opt()?.map(Scalar::Double),
            kind => {
                if input.read_bool()? {
                    Some(read_raw(input, kind)?)
                } else {
                    None
                }
            }
        };
        Ok(scalar.map_or(Value::Null, Value::Scalar))
    }
}
