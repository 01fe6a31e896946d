//! Built-in processors for the solidify codec.
//!
//! Covers nullable scalars, strings, primitive and boxed arrays for all eight
//! scalar kinds, plus the building blocks for user types: enums, records and
//! arrays of objects. [`standard`] returns the fixed set; enums, records and
//! object arrays are registered alongside it by the caller.

pub mod boxed_array;
pub mod enumeration;
pub mod keys;
pub mod object_array;
pub mod primitive_array;
pub mod record;
pub mod scalar;
pub mod string;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use solidify_core::{CodecResult, ObjectProcessor, Registry, ScalarKind};
use tracing::debug;

pub use boxed_array::BoxedArrayProcessor;
pub use enumeration::{EnumDef, EnumProcessor};
pub use object_array::ObjectArrayProcessor;
pub use primitive_array::PrimitiveArrayProcessor;
pub use record::{RecordDef, RecordProcessor};
pub use scalar::BoxedScalarProcessor;
pub use string::StringProcessor;

/// The string processor and, for every scalar kind, its boxed scalar,
/// primitive array and boxed array processors.
pub fn standard() -> Vec<Arc<dyn ObjectProcessor>> {
    let mut processors: Vec<Arc<dyn ObjectProcessor>> = Vec::with_capacity(1 + 3 * ScalarKind::ALL.len());
    processors.push(Arc::new(StringProcessor::new()));
    for kind in ScalarKind::ALL {
        processors.push(Arc::new(BoxedScalarProcessor::new(kind)));
        processors.push(Arc::new(PrimitiveArrayProcessor::new(kind)));
        processors.push(Arc::new(BoxedArrayProcessor::new(kind)));
    }
    processors
}

/// A registry of [`standard`] plus `extra`.
pub fn standard_registry(
    extra: impl IntoIterator<Item = Arc<dyn ObjectProcessor>>,
) -> CodecResult<Registry> {
    let registry = Registry::from_processors(standard().into_iter().chain(extra))?;
    debug!(types = registry.len(), caches = registry.cache_count(), "standard registry built");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidify_core::{CacheMode, CodecError};

    #[test]
    fn standard_set_covers_every_kind() {
        let registry = standard_registry([]).unwrap();
        assert_eq!(registry.len(), 25);
        assert!(registry.contains(&keys::STRING));
        for kind in ScalarKind::ALL {
            assert!(registry.contains(&keys::boxed(kind)));
            assert!(registry.contains(&keys::primitive_array(kind)));
            assert!(registry.contains(&keys::boxed_array(kind)));
        }
        // Boxed scalars are the only uncached built-ins.
        assert_eq!(registry.cache_count(), 17);
    }

    #[test]
    fn extras_register_alongside() {
        let color: Arc<dyn ObjectProcessor> = Arc::new(EnumProcessor::new("color", ["red"]).unwrap());
        let registry = standard_registry([color]).unwrap();
        assert_eq!(registry.len(), 26);
        let entry = registry.lookup(&"color".into()).unwrap();
        assert_eq!(entry.processor().cache_mode(), CacheMode::NoCache);
        assert!(entry.cache().is_none());
    }

    #[test]
    fn duplicate_extra_is_rejected() {
        let again: Arc<dyn ObjectProcessor> = Arc::new(StringProcessor::new());
        let err = standard_registry([again]).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateRegistration(ref key) if *key == keys::STRING));
    }
}
