//! # Remap: Message Transformation Core
//!
//! Remap lets a host process send opaque text payloads through a
//! transformation step: typed message values with two interchangeable
//! encodings, pluggable stream codecs, a composable multi-message input
//! stream, and a cache-backed execution helper that merges caller arguments
//! with cached defaults.
//!
//! ## Features
//!
//! - **Message values**: immutable text payloads, plain or base64-wrapped
//! - **Formatters**: stateless byte-stream codecs, one per encoding
//! - **Message collections**: ordered message handles collapsible into one
//!   logical input stream, released exactly once per call
//! - **Compile-once transform cache**: at most one compilation per identity,
//!   even under concurrent lookups
//! - **Transform catalog**: YAML-declared transform identities with default
//!   arguments and implementation bindings
//!
//! ## Example
//!
//! ```
//! use remap::{
//!     ArgumentList, Implementation, InMemoryMessage, InMemoryMessageFactory,
//!     MessageCollection, MessageContext, MessageValue, TransformCache,
//!     TransformCatalog, TransformDef, TransformRunner,
//! };
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! // declare a passthrough transform and build the runner
//! let mut catalog = TransformCatalog::new();
//! catalog.declare(TransformDef {
//!     identity: "concat-batch".to_string(),
//!     doc: None,
//!     arguments: vec![],
//!     implementation: Implementation::Copy,
//! }).unwrap();
//! let runner = TransformRunner::new(
//!     Arc::new(TransformCache::new(Box::new(catalog))),
//!     Arc::new(InMemoryMessageFactory::new()),
//! );
//!
//! // collect two messages and transform them into one
//! let mut messages = MessageCollection::new();
//! messages.add(Box::new(InMemoryMessage::from_value(&MessageValue::plain("A")).unwrap()));
//! messages.add(Box::new(InMemoryMessage::from_value(&MessageValue::plain("B")).unwrap()));
//!
//! let mut result = runner
//!     .transform(&MessageContext::new(), messages, "concat-batch", &ArgumentList::new())
//!     .unwrap();
//! let mut content = String::new();
//! result.take_stream().unwrap().read_to_string(&mut content).unwrap();
//! assert_eq!(content, "AB");
//! ```

// Core modules
pub mod collection;
pub mod composite;
pub mod formatter;
pub mod host;
pub mod message;

// Transform subsystem
pub mod transform;

// Re-export key types
pub use collection::MessageCollection;
pub use composite::CompositeReader;
pub use formatter::{FormatError, MessageFormatter};
pub use host::{
    HostError, InMemoryMessage, InMemoryMessageFactory, MessageContext, MessageFactory,
    MessageHandle, TRANSFORM_IDENTITY_PROPERTY,
};
pub use message::{MessageError, MessageValue};

// Re-export transform types
pub use transform::{
    Argument, ArgumentList, CopyTransform, Implementation, Transform, TransformCache,
    TransformCatalog, TransformCompiler, TransformDef, TransformDescriptor, TransformError,
    TransformRunner,
};
