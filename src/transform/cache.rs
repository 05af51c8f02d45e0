//! Compile-once transform cache.
//!
//! Resolving a transform identity compiles it at most once for the life of
//! the cache; every later lookup, and every lookup racing the in-flight
//! compilation, reuses the same descriptor. The cache never evicts.

use crate::transform::arguments::ArgumentList;
use crate::transform::map::{Transform, TransformError};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A compiled transform together with its default argument set.
pub struct TransformDescriptor {
    pub transform: Arc<dyn Transform>,
    pub defaults: ArgumentList,
}

impl TransformDescriptor {
    pub fn new(transform: Arc<dyn Transform>, defaults: ArgumentList) -> Self {
        Self {
            transform,
            defaults,
        }
    }
}

impl fmt::Debug for TransformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformDescriptor")
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Trait for the component that realizes a transform identity into a
/// runnable descriptor.
///
/// Implementations resolve the identity to a definition and build the
/// compiled transform plus its default arguments. Called at most once per
/// identity per cache fill; the cache takes care of sharing the result.
pub trait TransformCompiler: Send + Sync {
    /// Compile the transform behind `identity`.
    ///
    /// # Returns
    ///
    /// * `Ok(descriptor)` - compiled transform and default arguments
    /// * `Err(TransformError::NotFound)` - identity cannot be resolved
    /// * `Err(TransformError::CompileError)` - definition cannot be realized
    fn compile(&self, identity: &str) -> Result<TransformDescriptor, TransformError>;
}

/// Keyed store of compiled transforms with an at-most-once-compile
/// guarantee.
///
/// Each identity gets its own compile cell: the map lock is only held while
/// fetching the cell, and the compilation itself runs inside the cell, so
/// concurrent lookups of the same fresh identity block on one compilation
/// while lookups of other identities proceed. A failed compilation is
/// returned to every waiter but is not cached; a later lookup may try again.
pub struct TransformCache {
    compiler: Box<dyn TransformCompiler>,
    compiled: Mutex<HashMap<String, Arc<OnceCell<Arc<TransformDescriptor>>>>>,
}

impl TransformCache {
    /// Create a cache that compiles through the given compiler.
    pub fn new(compiler: Box<dyn TransformCompiler>) -> Self {
        Self {
            compiler,
            compiled: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the descriptor for `identity`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Propagates `NotFound` and `CompileError` from the compiler. These are
    /// fatal to the calling transform request and are never retried within
    /// the request.
    pub fn lookup(&self, identity: &str) -> Result<Arc<TransformDescriptor>, TransformError> {
        let cell = {
            let mut compiled = self
                .compiled
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            compiled
                .entry(identity.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let descriptor = cell.get_or_try_init(|| {
            tracing::debug!(identity, "compiling transform");
            self.compiler.compile(identity).map(Arc::new)
        })?;
        Ok(Arc::clone(descriptor))
    }

    /// Check whether `identity` has already been compiled.
    pub fn is_compiled(&self, identity: &str) -> bool {
        let compiled = self
            .compiled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        compiled
            .get(identity)
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }
}

impl fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compiled = self
            .compiled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f.debug_struct("TransformCache")
            .field("identities", &compiled.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::map::CopyTransform;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Compiler that counts invocations and can be made to fail.
    struct CountingCompiler {
        compilations: Arc<AtomicUsize>,
        fail_for: Option<String>,
    }

    impl CountingCompiler {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let compilations = Arc::new(AtomicUsize::new(0));
            let compiler = Self {
                compilations: compilations.clone(),
                fail_for: None,
            };
            (compiler, compilations)
        }
    }

    impl TransformCompiler for CountingCompiler {
        fn compile(&self, identity: &str) -> Result<TransformDescriptor, TransformError> {
            self.compilations.fetch_add(1, Ordering::SeqCst);
            // widen the race window for the concurrency test
            thread::sleep(Duration::from_millis(10));
            if self.fail_for.as_deref() == Some(identity) {
                return Err(TransformError::CompileError {
                    identity: identity.to_string(),
                    reason: "synthetic failure".to_string(),
                });
            }
            Ok(TransformDescriptor::new(
                Arc::new(CopyTransform),
                ArgumentList::new(),
            ))
        }
    }

    #[test]
    fn test_lookup_compiles_on_first_use() {
        let (compiler, compilations) = CountingCompiler::new();
        let cache = TransformCache::new(Box::new(compiler));

        assert!(!cache.is_compiled("copy"));
        cache.lookup("copy").unwrap();
        assert!(cache.is_compiled("copy"));
        assert_eq!(compilations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_lookup_reuses_descriptor() {
        let (compiler, compilations) = CountingCompiler::new();
        let cache = TransformCache::new(Box::new(compiler));

        let first = cache.lookup("copy").unwrap();
        let second = cache.lookup("copy").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(compilations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_lookups_compile_once() {
        let (compiler, compilations) = CountingCompiler::new();
        let cache = Arc::new(TransformCache::new(Box::new(compiler)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(thread::spawn(move || cache.lookup("copy").unwrap()));
        }
        let descriptors: Vec<Arc<TransformDescriptor>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(compilations.load(Ordering::SeqCst), 1);
        for descriptor in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], descriptor));
        }
    }

    #[test]
    fn test_distinct_identities_compile_separately() {
        let (compiler, compilations) = CountingCompiler::new();
        let cache = TransformCache::new(Box::new(compiler));

        let one = cache.lookup("one").unwrap();
        let two = cache.lookup("two").unwrap();

        assert!(!Arc::ptr_eq(&one, &two));
        assert_eq!(compilations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compile_failure_is_not_cached() {
        let (mut compiler, compilations) = CountingCompiler::new();
        compiler.fail_for = Some("broken".to_string());
        let cache = TransformCache::new(Box::new(compiler));

        let result = cache.lookup("broken");
        assert!(matches!(
            result,
            Err(TransformError::CompileError { .. })
        ));
        assert!(!cache.is_compiled("broken"));

        // the failure is reported again rather than served from the cache
        let retry = cache.lookup("broken");
        assert!(matches!(retry, Err(TransformError::CompileError { .. })));
        assert_eq!(compilations.load(Ordering::SeqCst), 2);
    }
}
