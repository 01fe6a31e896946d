//! Encoding entry point.

use std::io::{BufWriter, Write};
use std::sync::Arc;

use tracing::debug;

use crate::cache::WriterCache;
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::graph::Graph;
use crate::key::TypeKey;
use crate::processor::ObjectProcessor;
use crate::registry::Registry;
use crate::value::Value;
use crate::writer::ObjectWriter;

/// Writes values to one output stream.
///
/// A liquifier is one session: its caches live as long as it does, so a
/// value repeated across several [`liquify`](Self::liquify) calls is written
/// in full only once. The matching [`Solidifier`](crate::Solidifier) must
/// read the values back in the same order with the same types.
///
/// Object handles in values resolve against the liquifier's own graph; build
/// objects with [`graph_mut`](Self::graph_mut) or hand one over with
/// [`with_graph`](Self::with_graph).
pub struct Liquifier<W: Write> {
    out: BufWriter<W>,
    registry: Registry,
    caches: Vec<WriterCache>,
    graph: Graph,
    config: CodecConfig,
    bytes_written: u64,
    failed: bool,
}

impl<W: Write> Liquifier<W> {
    pub fn new(
        processors: impl IntoIterator<Item = Arc<dyn ObjectProcessor>>,
        output: W,
    ) -> CodecResult<Self> {
        Ok(Self::with_registry(Registry::from_processors(processors)?, output))
    }

    pub fn with_registry(registry: Registry, output: W) -> Self {
        Self::with_config(registry, output, CodecConfig::default())
    }

    pub fn with_config(registry: Registry, output: W, config: CodecConfig) -> Self {
        let caches = registry.writer_caches();
        debug!(
            processors = registry.len(),
            caches = caches.len(),
            "liquifier session opened"
        );
        Self {
            out: BufWriter::with_capacity(config.buffer_capacity, output),
            registry,
            caches,
            graph: Graph::new(),
            config,
            bytes_written: 0,
            failed: false,
        }
    }

    /// Replace the object graph values are resolved against.
    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = graph;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Write one value and flush it to the underlying stream.
    ///
    /// On error the stream holds a partial value, and every later call
    /// returns [`CodecError::SessionFailed`].
    pub fn liquify(&mut self, ty: &TypeKey, value: &Value) -> CodecResult<()> {
        let written = self.write_with(|writer| writer.write_object(ty, value))?;
        debug!(ty = %ty, bytes = written, "liquified value");
        Ok(())
    }

    /// Write each value in order, flushing once at the end.
    pub fn liquify_all(&mut self, ty: &TypeKey, values: &[Value]) -> CodecResult<()> {
        let written = self.write_with(|writer| writer.write_objects(ty, values))?;
        debug!(ty = %ty, count = values.len(), bytes = written, "liquified values");
        Ok(())
    }

    /// Whether an earlier call failed and the session refuses further writes.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn write_with(
        &mut self,
        write: impl FnOnce(&mut ObjectWriter<'_>) -> CodecResult<()>,
    ) -> CodecResult<u64> {
        if self.failed {
            return Err(CodecError::SessionFailed);
        }
        let written = {
            let mut writer = ObjectWriter::new(
                &mut self.out,
                &self.registry,
                &mut self.caches,
                &self.graph,
                &self.config,
            );
            write(&mut writer).map(|()| writer.position())
        }
        .and_then(|written| {
            self.out.flush()?;
            Ok(written)
        });
        match written {
            Ok(written) => {
                self.bytes_written += written;
                Ok(written)
            }
            Err(err) => {
                debug!(error = %err, "liquifier session failed");
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Total bytes produced by this session.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and return the underlying stream.
    pub fn into_inner(self) -> CodecResult<W> {
        self.out
            .into_inner()
            .map_err(|e| CodecError::Io(e.into_error()))
    }
}
