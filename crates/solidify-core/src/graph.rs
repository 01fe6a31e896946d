//! Arena of identity-bearing objects.
//!
//! Records and object arrays are nodes in a [`Graph`] addressed by
//! [`ObjectRef`] handles. Two values are the same object exactly when their
//! handles are equal, which is what the identity cache keys on. Cycles are
//! plain handle loops and need no reference counting.
//!
//! A node may be reserved before its contents are known and filled later.
//! The reader relies on this: a node's handle goes into the object cache
//! before its body is decoded, so the body can refer back to it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::key::TypeKey;
use crate::value::Value;

/// Handle to a node in a [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef(usize);

impl ObjectRef {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One object: its type and its ordered contents (record fields or array
/// elements).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub ty: TypeKey,
    pub items: Vec<Value>,
}

impl Node {
    pub fn new(ty: TypeKey, items: Vec<Value>) -> Self {
        Self { ty, items }
    }
}

/// Object arena.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, reserved ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reserve a handle whose node is filled later with [`fill`](Self::fill).
    pub fn reserve(&mut self) -> ObjectRef {
        self.nodes.push(None);
        ObjectRef(self.nodes.len() - 1)
    }

    /// Complete a reserved node. Each node is filled exactly once.
    pub fn fill(&mut self, obj: ObjectRef, node: Node) -> CodecResult<()> {
        match self.nodes.get_mut(obj.0) {
            None => Err(CodecError::DanglingReference(obj)),
            Some(Some(_)) => Err(CodecError::invalid(format!("object {obj} filled twice"))),
            Some(slot) => {
                *slot = Some(node);
                Ok(())
            }
        }
    }

    /// Add a complete node.
    pub fn insert(&mut self, node: Node) -> ObjectRef {
        self.nodes.push(Some(node));
        ObjectRef(self.nodes.len() - 1)
    }

    /// The node behind `obj`, if it exists and has been filled.
    pub fn get(&self, obj: ObjectRef) -> Option<&Node> {
        self.nodes.get(obj.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, obj: ObjectRef) -> Option<&mut Node> {
        self.nodes.get_mut(obj.0).and_then(Option::as_mut)
    }

    /// Like [`get`](Self::get) but a missing node is an error.
    pub fn node(&self, obj: ObjectRef) -> CodecResult<&Node> {
        self.get(obj).ok_or(CodecError::DanglingReference(obj))
    }

    /// Filled nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (ObjectRef(i), n)))
    }

    /// Whether `a` in this graph and `b` in `other` describe the same
    /// object structure.
    ///
    /// Handles may differ between the graphs; what must match is the shape:
    /// types, contents, and which positions point at the same object. Shared
    /// and cyclic references must line up one-to-one.
    pub fn same_shape(&self, a: &Value, other: &Graph, b: &Value) -> bool {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        self.shape_eq(a, other, b, &mut forward, &mut backward)
    }

    fn shape_eq(
        &self,
        a: &Value,
        other: &Graph,
        b: &Value,
        forward: &mut HashMap<ObjectRef, ObjectRef>,
        backward: &mut HashMap<ObjectRef, ObjectRef>,
    ) -> bool {
        let (x, y) = match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => (*x, *y),
            (Value::Ref(_), _) | (_, Value::Ref(_)) => return false,
            _ => return a == b,
        };
        match (forward.get(&x), backward.get(&y)) {
            (Some(fx), Some(by)) => return *fx == y && *by == x,
            (None, None) => {}
            _ => return false,
        }
        forward.insert(x, y);
        backward.insert(y, x);
        let (Some(left), Some(right)) = (self.get(x), other.get(y)) else {
            return false;
        };
        left.ty == right.ty
            && left.items.len() == right.items.len()
            && left
                .items
                .iter()
                .zip(&right.items)
                .all(|(l, r)| self.shape_eq(l, other, r, forward, backward))
    }
}
