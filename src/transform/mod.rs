//! Transform subsystem: compiled transforms, argument handling, the
//! compile-once cache, the YAML catalog, and the execution helper.

pub mod arguments;
pub mod cache;
pub mod catalog;
pub mod map;
pub mod runner;

// Re-export key types
pub use arguments::{Argument, ArgumentList};
pub use cache::{TransformCache, TransformCompiler, TransformDescriptor};
pub use catalog::{Implementation, TransformCatalog, TransformDef};
pub use map::{CopyTransform, Transform, TransformError};
pub use runner::TransformRunner;
