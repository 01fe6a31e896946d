//! Round-trip helpers shared by the processor tests.

use std::sync::Arc;

use solidify_core::{CodecResult, Graph, Liquifier, ObjectProcessor, Solidifier, TypeKey, Value};

pub fn encode_with(
    processors: Vec<Arc<dyn ObjectProcessor>>,
    graph: Graph,
    ty: &TypeKey,
    values: &[Value],
) -> CodecResult<Vec<u8>> {
    let mut liq = Liquifier::new(processors, Vec::new())?.with_graph(graph);
    liq.liquify_all(ty, values)?;
    liq.into_inner()
}

pub fn decode_with(
    processors: Vec<Arc<dyn ObjectProcessor>>,
    bytes: &[u8],
    ty: &TypeKey,
    count: usize,
) -> CodecResult<(Vec<Value>, Graph)> {
    let mut sol = Solidifier::new(processors, bytes)?;
    let values = sol.solidify_many(ty, count)?;
    assert_eq!(sol.bytes_read(), bytes.len() as u64, "trailing bytes");
    Ok((values, sol.into_graph()))
}

pub fn encode(ty: &TypeKey, values: &[Value]) -> CodecResult<Vec<u8>> {
    encode_with(crate::standard(), Graph::new(), ty, values)
}

pub fn decode(bytes: &[u8], ty: &TypeKey, count: usize) -> CodecResult<Vec<Value>> {
    decode_with(crate::standard(), bytes, ty, count).map(|(values, _)| values)
}

/// Encode then decode plain (handle-free) values.
pub fn roundtrip(ty: &TypeKey, values: &[Value]) -> Vec<Value> {
    let bytes = encode(ty, values).unwrap();
    decode(&bytes, ty, values.len()).unwrap()
}
