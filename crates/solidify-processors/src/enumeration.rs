//! Enumerations, encoded by ordinal.
//!
//! Not cached. Enums with at most 254 constants take one byte, larger ones
//! two; the all-ones pattern (`0xFF` / `0xFFFF`) is null. An ordinal at or
//! beyond the constant count is a data error, which catches writer and
//! reader disagreeing on the definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solidify_core::{
    mismatch, CacheId, CacheMode, CodecError, CodecResult, ObjectProcessor, ObjectReader,
    ObjectWriter, TypeKey, Value,
};

/// Most constants an enum can declare.
pub const MAX_CONSTANTS: usize = 0xFFFE;
/// Most constants that still use the one-byte encoding.
pub const MAX_NARROW_CONSTANTS: usize = 0xFE;

const NARROW_NULL: u8 = 0xFF;
const WIDE_NULL: u16 = 0xFFFF;

/// Declarative form of an enum, loadable from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: TypeKey,
    pub constants: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EnumProcessor {
    key: TypeKey,
    constants: Vec<String>,
    ordinals: HashMap<String, u16>,
}

impl EnumProcessor {
    pub fn new<S: Into<String>>(
        key: impl Into<TypeKey>,
        constants: impl IntoIterator<Item = S>,
    ) -> CodecResult<Self> {
        let key = key.into();
        let constants: Vec<String> = constants.into_iter().map(Into::into).collect();
        if constants.len() > MAX_CONSTANTS {
            return Err(CodecError::InvalidArgument(format!(
                "enum {key} declares {} constants, at most {MAX_CONSTANTS} are supported",
                constants.len()
            )));
        }
        let mut ordinals = HashMap::with_capacity(constants.len());
        for (ordinal, name) in (0u16..).zip(&constants) {
            if ordinals.insert(name.clone(), ordinal).is_some() {
                return Err(CodecError::InvalidArgument(format!(
                    "enum {key} declares {name} twice"
                )));
            }
        }
        Ok(Self {
            key,
            constants,
            ordinals,
        })
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Whether ordinals fit in one byte.
    pub fn is_narrow(&self) -> bool {
        self.constants.len() <= MAX_NARROW_CONSTANTS
    }

    pub fn ordinal_of(&self, name: &str) -> Option<u16> {
        self.ordinals.get(name).copied()
    }

    pub fn name_of(&self, ordinal: u16) -> Option<&str> {
        self.constants.get(usize::from(ordinal)).map(String::as_str)
    }

    /// The value for constant `name`.
    pub fn value_of(&self, name: &str) -> CodecResult<Value> {
        self.ordinal_of(name).map(Value::Enum).ok_or_else(|| {
            CodecError::InvalidArgument(format!("enum {} has no constant {name}", self.key))
        })
    }

    pub fn def(&self) -> EnumDef {
        EnumDef {
            name: self.key.clone(),
            constants: self.constants.clone(),
        }
    }
}

impl TryFrom<EnumDef> for EnumProcessor {
    type Error = CodecError;

    fn try_from(def: EnumDef) -> CodecResult<Self> {
        Self::new(def.name, def.constants)
    }
}

impl ObjectProcessor for EnumProcessor {
    fn type_key(&self) -> &TypeKey {
        &self.key
    }

    fn cache_mode(&self) -> CacheMode {
        CacheMode::NoCache
    }

    fn liquify(&self, out: &mut ObjectWriter<'_>, _cache: Option<CacheId>, value: &Value) -> CodecResult<()> {
        let ordinal = match value {
            Value::Null => None,
            Value::Enum(ordinal) if usize::from(*ordinal) < self.len() => Some(*ordinal),
            Value::Enum(ordinal) => {
                return Err(CodecError::InvalidArgument(format!(
                    "ordinal {ordinal} is out of range for enum {} of {} constants",
                    self.key,
                    self.len()
                )))
            }
            other => return Err(mismatch(&self.key, "enum", other)),
        };
        // In range ordinals never reach the null pattern of their width.
        match (self.is_narrow(), ordinal) {
            (true, None) => out.write_u8(NARROW_NULL)?,
            (true, Some(o)) => out.write_u8(o as u8)?,
            (false, None) => out.write_u16(WIDE_NULL)?,
            (false, Some(o)) => out.write_u16(o)?,
        }
        Ok(())
    }

    fn solidify(&self, input: &mut ObjectReader<'_>, _cache: Option<CacheId>) -> CodecResult<Value> {
        let ordinal = if self.is_narrow() {
            match input.read_u8()? {
                NARROW_NULL => return Ok(Value::Null),
                byte => u16::from(byte),
            }
        } else {
            match input.read_u16()? {
                WIDE_NULL => return Ok(Value::Null),
                word => word,
            }
        };
        if usize::from(ordinal) >= self.len() {
            return Err(CodecError::InvalidData(format!(
                "ordinal {ordinal} is out of range for enum {} of {} constants",
                self.key,
                self.len()
            )));
        }
        Ok(Value::Enum(ordinal))
    }
}
