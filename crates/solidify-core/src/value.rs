//! Dynamically typed values flowing through the codec.
//!
//! Floating point payloads compare and hash by bit pattern, so `-0.0` and
//! `0.0` are different values while a NaN equals itself. Equality caching
//! and round-trip checks both rely on this.
//!
//! String and array payloads sit behind an [`Arc`]: cloning a [`Value`]
//! never copies its contents, so a back-reference costs one refcount.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::ObjectRef;

/// The eight primitive scalar kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// UTF-16 code unit.
    Char,
}

impl ScalarKind {
    /// Every kind, in declaration order.
    pub const ALL: [ScalarKind; 8] = [
        Self::Bool,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Char,
    ];

    /// Short name used in built-in type keys and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "u8",
            Self::Short => "i16",
            Self::Int => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::Char => "char",
        }
    }

    /// Encoded width of one raw value in bytes. Booleans report one byte
    /// even though arrays of them are bit-packed.
    pub const fn width(self) -> usize {
        match self {
            Self::Bool | Self::Byte => 1,
            Self::Short | Self::Char => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
        }
    }
}

/// A single primitive value.
#[derive(Clone, Copy, Debug)]
pub enum Scalar {
    Bool(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(u16),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Byte(_) => ScalarKind::Byte,
            Self::Short(_) => ScalarKind::Short,
            Self::Int(_) => ScalarKind::Int,
            Self::Long(_) => ScalarKind::Long,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
            Self::Char(_) => ScalarKind::Char,
        }
    }

    fn bits(&self) -> u64 {
        match *self {
            Self::Bool(v) => u64::from(v),
            Self::Byte(v) => u64::from(v),
            Self::Short(v) => u64::from(v as u16),
            Self::Int(v) => u64::from(v as u32),
            Self::Long(v) => v as u64,
            Self::Float(v) => u64::from(v.to_bits()),
            Self::Double(v) => v.to_bits(),
            Self::Char(v) => u64::from(v),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.bits() == other.bits()
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.bits().hash(state);
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Scalar {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        })*
    };
}

scalar_from!(bool => Bool, u8 => Byte, i16 => Short, i32 => Int, i64 => Long, f32 => Float, f64 => Double);

/// A dense array of one primitive kind.
#[derive(Clone, Debug)]
pub enum PrimitiveArray {
    Bool(Vec<bool>),
    Byte(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Char(Vec<u16>),
}

impl PrimitiveArray {
    /// An empty array of the given kind.
    pub fn empty(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool(Vec::new()),
            ScalarKind::Byte => Self::Byte(Vec::new()),
            ScalarKind::Short => Self::Short(Vec::new()),
            ScalarKind::Int => Self::Int(Vec::new()),
            ScalarKind::Long => Self::Long(Vec::new()),
            ScalarKind::Float => Self::Float(Vec::new()),
            ScalarKind::Double => Self::Double(Vec::new()),
            ScalarKind::Char => Self::Char(Vec::new()),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Byte(_) => ScalarKind::Byte,
            Self::Short(_) => ScalarKind::Short,
            Self::Int(_) => ScalarKind::Int,
            Self::Long(_) => ScalarKind::Long,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
            Self::Char(_) => ScalarKind::Char,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Byte(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Char(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for PrimitiveArray {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Double(a), Self::Double(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Char(a), Self::Char(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PrimitiveArray {}

impl Hash for PrimitiveArray {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::Byte(v) => v.hash(state),
            Self::Short(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Float(v) => {
                state.write_usize(v.len());
                v.iter().for_each(|x| x.to_bits().hash(state));
            }
            Self::Double(v) => {
                state.write_usize(v.len());
                v.iter().for_each(|x| x.to_bits().hash(state));
            }
            Self::Char(v) => v.hash(state),
        }
    }
}

/// An array of nullable scalars of one kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoxedArray {
    pub kind: ScalarKind,
    pub items: Vec<Option<Scalar>>,
}

impl BoxedArray {
    pub fn new(kind: ScalarKind, items: Vec<Option<Scalar>>) -> Self {
        Self { kind, items }
    }

    pub fn empty(kind: ScalarKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Any value the codec can carry.
///
/// Identity-bearing objects (records, object arrays) live in a
/// [`Graph`](crate::graph::Graph) and appear here only as [`Value::Ref`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    /// Enum constant by ordinal.
    Enum(u16),
    Str(Arc<str>),
    Primitives(Arc<PrimitiveArray>),
    Boxed(Arc<BoxedArray>),
    Ref(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Human-readable variant name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(s) => s.kind().name(),
            Self::Enum(_) => "enum",
            Self::Str(_) => "string",
            Self::Primitives(_) => "primitive array",
            Self::Boxed(_) => "boxed array",
            Self::Ref(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Self::Ref(obj) => Some(*obj),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<PrimitiveArray> for Value {
    fn from(a: PrimitiveArray) -> Self {
        Self::Primitives(Arc::new(a))
    }
}

impl From<BoxedArray> for Value {
    fn from(a: BoxedArray) -> Self {
        Self::Boxed(Arc::new(a))
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Ref(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
