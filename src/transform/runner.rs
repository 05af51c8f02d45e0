//! Transform execution helper.
//!
//! Coordinates a single transformation call: collapse the input collection,
//! resolve the compiled transform through the cache, merge arguments,
//! execute, and package the output as a new host message. The input
//! collection is released on every exit path.

use crate::collection::MessageCollection;
use crate::host::{MessageContext, MessageFactory, MessageHandle, TRANSFORM_IDENTITY_PROPERTY};
use crate::transform::arguments::ArgumentList;
use crate::transform::cache::TransformCache;
use crate::transform::map::TransformError;
use std::io::Cursor;
use std::sync::Arc;

/// Applies cached transforms to message collections.
///
/// Holds the shared transform cache and the host message factory as injected
/// dependencies; carries no per-call state, so one runner serves any number
/// of concurrent calls.
///
/// # Example
///
/// ```
/// use remap::{
///     ArgumentList, InMemoryMessage, InMemoryMessageFactory, MessageCollection,
///     MessageContext, MessageValue, TransformCache, TransformCatalog, TransformDef,
///     Implementation, TransformRunner,
/// };
/// use std::sync::Arc;
///
/// let mut catalog = TransformCatalog::new();
/// catalog.declare(TransformDef {
///     identity: "concat".to_string(),
///     doc: None,
///     arguments: vec![],
///     implementation: Implementation::Copy,
/// }).unwrap();
///
/// let runner = TransformRunner::new(
///     Arc::new(TransformCache::new(Box::new(catalog))),
///     Arc::new(InMemoryMessageFactory::new()),
/// );
///
/// let mut messages = MessageCollection::new();
/// messages.add(Box::new(InMemoryMessage::from_value(&MessageValue::plain("A")).unwrap()));
/// messages.add(Box::new(InMemoryMessage::from_value(&MessageValue::plain("B")).unwrap()));
///
/// let mut result = runner
///     .transform(&MessageContext::new(), messages, "concat", &ArgumentList::new())
///     .unwrap();
/// let mut stream = result.take_stream().unwrap();
/// let mut content = String::new();
/// std::io::Read::read_to_string(&mut stream, &mut content).unwrap();
/// assert_eq!(content, "AB");
/// ```
pub struct TransformRunner {
    cache: Arc<TransformCache>,
    factory: Arc<dyn MessageFactory>,
}

impl TransformRunner {
    /// Create a runner over the given cache and message factory.
    pub fn new(cache: Arc<TransformCache>, factory: Arc<dyn MessageFactory>) -> Self {
        Self { cache, factory }
    }

    /// Apply the transform behind `identity` to the collected messages.
    ///
    /// The collection is collapsed into one input stream (multi-message
    /// collections are read end-to-end in insertion order), the transform's
    /// default arguments are merged with `arguments` (caller wins), and the
    /// output is handed to the message factory as the body of a new message.
    ///
    /// Every handle in `messages` is released before this method returns,
    /// whether it succeeds or fails.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - empty collection or empty identity; nothing is
    ///   looked up or executed
    /// * `NotFound` / `CompileError` - from the cache lookup
    /// * `ExecutionError` - the transform failed while running; no output
    ///   message is constructed
    pub fn transform(
        &self,
        context: &MessageContext,
        messages: MessageCollection,
        identity: &str,
        arguments: &ArgumentList,
    ) -> Result<Box<dyn MessageHandle>, TransformError> {
        if messages.is_empty() {
            return Err(TransformError::InvalidArgument(
                "message collection is empty".to_string(),
            ));
        }
        if identity.is_empty() {
            return Err(TransformError::InvalidArgument(
                "transform identity is empty".to_string(),
            ));
        }

        let mut messages = messages;
        let result = self.run(context, &mut messages, identity, arguments);
        // the Drop impl covers panic paths; this keeps release deterministic
        messages.dispose();
        result
    }

    /// Apply the transform behind `identity` to a single message.
    pub fn transform_message(
        &self,
        context: &MessageContext,
        message: Box<dyn MessageHandle>,
        identity: &str,
        arguments: &ArgumentList,
    ) -> Result<Box<dyn MessageHandle>, TransformError> {
        self.transform(
            context,
            MessageCollection::from_handles(vec![message]),
            identity,
            arguments,
        )
    }

    /// Apply the transform named by the context's transform-identity
    /// property.
    ///
    /// # Errors
    ///
    /// `NotFound` if the context does not carry the property.
    pub fn transform_with_context(
        &self,
        context: &MessageContext,
        messages: MessageCollection,
        arguments: &ArgumentList,
    ) -> Result<Box<dyn MessageHandle>, TransformError> {
        let identity = context
            .transform_identity()
            .ok_or_else(|| {
                TransformError::NotFound(format!(
                    "context property '{}' is absent",
                    TRANSFORM_IDENTITY_PROPERTY
                ))
            })?
            .to_string();
        self.transform(context, messages, &identity, arguments)
    }

    fn run(
        &self,
        context: &MessageContext,
        messages: &mut MessageCollection,
        identity: &str,
        arguments: &ArgumentList,
    ) -> Result<Box<dyn MessageHandle>, TransformError> {
        tracing::debug!(identity, messages = messages.len(), "about to execute transform");

        let mut input = messages.collapse()?;
        let descriptor = self.cache.lookup(identity)?;
        let merged = descriptor.defaults.union(arguments);

        // output is plain UTF-8 bytes in memory; the transform only sees a
        // Write and can never close it
        let mut output = Cursor::new(Vec::new());
        tracing::debug!(identity, "executing transform");
        descriptor
            .transform
            .apply(&mut *input, &merged, &mut output)
            .map_err(|e| match e {
                TransformError::ExecutionError { reason, .. } => TransformError::ExecutionError {
                    identity: identity.to_string(),
                    reason,
                },
                other => TransformError::ExecutionError {
                    identity: identity.to_string(),
                    reason: other.to_string(),
                },
            })?;
        // the composite input has been fully consumed; release it before
        // packaging the result
        drop(input);

        output.set_position(0);
        let result = self.factory.create_message(context, &mut output)?;
        Ok(result)
    }
}

impl std::fmt::Debug for TransformRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRunner")
            .field("cache", &self.cache)
            .finish()
    }
}
