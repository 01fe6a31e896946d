//! Decoding entry point.

use std::io::{BufReader, Read};
use std::sync::Arc;

use tracing::debug;

use crate::cache::ReaderCache;
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::graph::{Graph, Node, ObjectRef};
use crate::key::TypeKey;
use crate::processor::ObjectProcessor;
use crate::reader::ObjectReader;
use crate::registry::Registry;
use crate::value::Value;

/// Reads values from one input stream.
///
/// The counterpart of [`Liquifier`](crate::Liquifier): one session, caches
/// shared across calls. Decoded objects are built into the solidifier's
/// graph and returned as handles.
///
/// Any error leaves the caches out of step with the stream: every later call
/// returns [`CodecError::SessionFailed`].
pub struct Solidifier<R: Read> {
    input: BufReader<R>,
    registry: Registry,
    caches: Vec<ReaderCache>,
    graph: Graph,
    config: CodecConfig,
    bytes_read: u64,
    failed: bool,
}

impl<R: Read> Solidifier<R> {
    pub fn new(
        processors: impl IntoIterator<Item = Arc<dyn ObjectProcessor>>,
        input: R,
    ) -> CodecResult<Self> {
        Self::with_registry(Registry::from_processors(processors)?, input)
    }

    pub fn with_registry(registry: Registry, input: R) -> CodecResult<Self> {
        Self::with_config(registry, input, CodecConfig::default())
    }

    pub fn with_config(registry: Registry, input: R, config: CodecConfig) -> CodecResult<Self> {
        let mut graph = Graph::new();
        let caches = registry.reader_caches(&mut graph)?;
        debug!(
            processors = registry.len(),
            caches = caches.len(),
            "solidifier session opened"
        );
        Ok(Self {
            input: BufReader::with_capacity(config.buffer_capacity, input),
            registry,
            caches,
            graph,
            config,
            bytes_read: 0,
            failed: false,
        })
    }

    /// Read one value of type `ty`.
    pub fn solidify(&mut self, ty: &TypeKey) -> CodecResult<Value> {
        let (value, read) = self.read_with(|reader| reader.read_object(ty))?;
        debug!(ty = %ty, bytes = read, objects = self.graph.len(), "solidified value");
        Ok(value)
    }

    /// Read `count` consecutive values of type `ty`.
    pub fn solidify_many(&mut self, ty: &TypeKey, count: usize) -> CodecResult<Vec<Value>> {
        let (values, read) = self.read_with(|reader| reader.read_objects(ty, count))?;
        debug!(ty = %ty, count, bytes = read, objects = self.graph.len(), "solidified values");
        Ok(values)
    }

    /// Whether an earlier call failed and the session refuses further reads.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn read_with<T>(
        &mut self,
        read: impl FnOnce(&mut ObjectReader<'_>) -> CodecResult<T>,
    ) -> CodecResult<(T, u64)> {
        if self.failed {
            return Err(CodecError::SessionFailed);
        }
        let result = {
            let mut reader = ObjectReader::new(
                &mut self.input,
                &self.registry,
                &mut self.caches,
                &mut self.graph,
                &self.config,
            );
            read(&mut reader).map(|value| (value, reader.position()))
        };
        match result {
            Ok((value, read)) => {
                self.bytes_read += read;
                Ok((value, read))
            }
            Err(err) => {
                debug!(error = %err, "solidifier session failed");
                self.failed = true;
                Err(err)
            }
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Resolve a decoded handle.
    pub fn node(&self, obj: ObjectRef) -> CodecResult<&Node> {
        self.graph.node(obj)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Total bytes consumed by this session.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Keep the decoded objects, dropping the stream and caches.
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Bytes already pulled from the stream but not yet decoded.
    pub fn buffered(&self) -> &[u8] {
        self.input.buffer()
    }

    /// Return the underlying stream. Bytes still [`buffered`](Self::buffered)
    /// are lost; use [`into_parts`](Self::into_parts) to keep them.
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// Return the underlying stream together with the bytes read from it
    /// past the last decoded value.
    pub fn into_parts(self) -> (R, Vec<u8>) {
        let rest = self.input.buffer().to_vec();
        (self.input.into_inner(), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liquifier::Liquifier;
    use crate::testing::{processors, LINK, TEXT};

    fn solidifier(bytes: &[u8]) -> Solidifier<&[u8]> {
        Solidifier::new(processors(), bytes).unwrap()
    }

    #[test]
    fn preloaded_values_decode_without_bodies() {
        let mut sol = solidifier(&[0, 0, 0, 0, 1, 0]);
        assert_eq!(sol.solidify(&TEXT).unwrap(), Value::Null);
        assert_eq!(sol.solidify(&TEXT).unwrap(), Value::Null);
        assert_eq!(sol.solidify(&TEXT).unwrap(), Value::from(""));
        assert_eq!(sol.bytes_read(), 6);
    }

    #[test]
    fn back_references_span_calls() {
        let bytes = [0xFE, 0xFF, 0x00, 0x00, b'h', b'i', 0x02, 0x00];
        let mut sol = solidifier(&bytes);
        let first = sol.solidify(&TEXT).unwrap();
        let second = sol.solidify(&TEXT).unwrap();
        assert_eq!(first, Value::from("hi"));
        assert_eq!(second, first);
    }

    #[test]
    fn self_link_resolves_to_same_object() {
        let bytes = [0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, b'a', 0x01, 0x00];
        let mut sol = solidifier(&bytes);
        let value = sol.solidify(&LINK).unwrap();
        let obj = value.as_object().unwrap();
        let node = sol.node(obj).unwrap();
        assert_eq!(node.items, vec![Value::from("a"), Value::Ref(obj)]);
    }

    #[test]
    fn roundtrip_shared_and_cyclic_links() {
        // a -> b -> a, written twice.
        let mut liq = Liquifier::new(processors(), Vec::new()).unwrap();
        let a = liq.graph_mut().reserve();
        let b = liq
            .graph_mut()
            .insert(Node::new(LINK, vec![Value::from("b"), Value::Ref(a)]));
        liq.graph_mut()
            .fill(a, Node::new(LINK, vec![Value::from("a"), Value::Ref(b)]))
            .unwrap();
        liq.liquify_all(&LINK, &[Value::Ref(a), Value::Ref(a)]).unwrap();
        let source = liq.graph().clone();
        let bytes = liq.into_inner().unwrap();

        let mut sol = solidifier(&bytes);
        let values = sol.solidify_many(&LINK, 2).unwrap();
        assert_eq!(values[0], values[1]);
        assert!(sol.graph().same_shape(&values[0], &source, &Value::Ref(a)));
        assert_eq!(sol.bytes_read(), bytes.len() as u64);
    }

    #[test]
    fn truncated_body_is_data_error() {
        let mut sol = solidifier(&[0xFD, 0xFF, 0x00, 0x00, b'a']);
        let err = sol.solidify(&TEXT).unwrap_err();
        assert!(err.is_data_error(), "{err}");
    }

    #[test]
    fn bad_reference_is_data_error() {
        let mut sol = solidifier(&[0x07, 0x00]);
        let err = sol.solidify(&TEXT).unwrap_err();
        assert!(matches!(err, CodecError::InvalidData(_)));
    }

    #[test]
    fn unregistered_type_is_usage_error() {
        let mut sol = solidifier(&[]);
        let err = sol.solidify(&TypeKey::from_static("nope")).unwrap_err();
        assert!(err.is_usage_error());
    }

    #[test]
    fn failed_session_refuses_further_reads() {
        // A dangling back-reference followed by a valid null.
        let mut sol = solidifier(&[0x07, 0x00, 0x00, 0x00]);
        assert!(sol.solidify(&TEXT).unwrap_err().is_data_error());
        assert!(sol.is_failed());
        let err = sol.solidify(&TEXT).unwrap_err();
        assert!(matches!(err, CodecError::SessionFailed));
    }

    #[test]
    fn trailing_stream_bytes_are_recoverable() {
        let bytes = [0xFE, 0xFF, 0x00, 0x00, b'h', b'i', b'r', b'e', b's', b't'];
        let mut sol = solidifier(&bytes);
        assert_eq!(sol.solidify(&TEXT).unwrap(), Value::from("hi"));
        assert_eq!(sol.buffered(), b"rest");
        let (stream, rest) = sol.into_parts();
        assert!(stream.is_empty());
        assert_eq!(rest, b"rest");
    }
}
