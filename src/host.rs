//! Host integration seams.
//!
//! The orchestration host owns message storage and context propagation; this
//! module defines the traits the core consumes as injected dependencies,
//! plus in-memory implementations suitable for hosts that keep message
//! bodies in process memory, and for tests.

use crate::message::{MessageError, MessageValue};
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};

/// Well-known context property carrying the transform identity.
pub const TRANSFORM_IDENTITY_PROPERTY: &str = "TransformIdentity";

/// Error type for host message operations
#[derive(Debug)]
pub enum HostError {
    /// The message body stream was already taken.
    StreamConsumed,
    /// The message handle was already disposed.
    Disposed,
    IoError(std::io::Error),
}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        HostError::IoError(err)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::StreamConsumed => write!(f, "Message body stream already consumed"),
            HostError::Disposed => write!(f, "Message handle already disposed"),
            HostError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for HostError {}

/// An opaque handle to a host-stored message.
///
/// The handle exposes the message body as a single-use readable stream and
/// releases whatever host resources back it when disposed. Byte content is
/// owned by the host store; the handle only mediates access.
pub trait MessageHandle: Send {
    /// Take the message body as a readable stream.
    ///
    /// The stream may be taken at most once per handle; a second call, or a
    /// call after [`MessageHandle::dispose`], is an error.
    fn take_stream(&mut self) -> Result<Box<dyn Read + Send>, HostError>;

    /// Release the host resources behind this handle.
    ///
    /// Idempotent: disposing an already-disposed handle is a no-op, never an
    /// error.
    fn dispose(&mut self);
}

/// Factory for new host messages.
///
/// The host store creates a message from a context and a content stream and
/// hands back an opaque handle with a single body part.
pub trait MessageFactory: Send + Sync {
    fn create_message(
        &self,
        context: &MessageContext,
        content: &mut dyn Read,
    ) -> Result<Box<dyn MessageHandle>, HostError>;
}

/// Opaque key-value context carried alongside messages.
///
/// The core never enumerates the context; it only resolves individual
/// properties by name. The one property it knows about is
/// [`TRANSFORM_IDENTITY_PROPERTY`], which hosts may use to select the
/// transform to apply.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    properties: HashMap<String, String>,
}

impl MessageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property assignment.
    ///
    /// # Example
    ///
    /// ```
    /// use remap::MessageContext;
    ///
    /// let ctx = MessageContext::new()
    ///     .with_property("Source", "orders-inbound")
    ///     .with_property("TransformIdentity", "orders-to-invoice");
    /// assert_eq!(ctx.transform_identity(), Some("orders-to-invoice"));
    /// ```
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|s| s.as_str())
    }

    /// Resolve the transform identity property, if present.
    pub fn transform_identity(&self) -> Option<&str> {
        self.get(TRANSFORM_IDENTITY_PROPERTY)
    }

    pub fn from_hashmap(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }
}

/// A message handle whose body lives in process memory.
///
/// Useful for hosts without a backing store and as the message type produced
/// by [`InMemoryMessageFactory`].
pub struct InMemoryMessage {
    body: Option<Vec<u8>>,
    disposed: bool,
}

impl InMemoryMessage {
    /// Create a message from raw body bytes.
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body: Some(body),
            disposed: false,
        }
    }

    /// Create a message from a message value.
    ///
    /// The body is the value's byte form: UTF-8 text for a plain value, the
    /// decoded payload for a base64 value.
    pub fn from_value(value: &MessageValue) -> Result<Self, MessageError> {
        Ok(Self::new(value.to_bytes()?))
    }
}

impl MessageHandle for InMemoryMessage {
    fn take_stream(&mut self) -> Result<Box<dyn Read + Send>, HostError> {
        if self.disposed {
            return Err(HostError::Disposed);
        }
        let body = self.body.take().ok_or(HostError::StreamConsumed)?;
        Ok(Box::new(Cursor::new(body)))
    }

    fn dispose(&mut self) {
        self.body = None;
        self.disposed = true;
    }
}

impl fmt::Debug for InMemoryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMessage")
            .field("body_len", &self.body.as_ref().map(|b| b.len()))
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Message factory backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageFactory;

impl InMemoryMessageFactory {
    pub fn new() -> Self {
        Self
    }
}

impl MessageFactory for InMemoryMessageFactory {
    fn create_message(
        &self,
        _context: &MessageContext,
        content: &mut dyn Read,
    ) -> Result<Box<dyn MessageHandle>, HostError> {
        let mut body = Vec::new();
        content.read_to_end(&mut body)?;
        Ok(Box::new(InMemoryMessage::new(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_stream_is_single_use() {
        let mut message = InMemoryMessage::new(b"body".to_vec());

        let mut stream = message.take_stream().unwrap();
        let mut content = String::new();
        stream.read_to_string(&mut content).unwrap();
        assert_eq!(content, "body");

        assert!(matches!(
            message.take_stream(),
            Err(HostError::StreamConsumed)
        ));
    }

    #[test]
    fn test_take_stream_after_dispose() {
        let mut message = InMemoryMessage::new(b"body".to_vec());
        message.dispose();

        assert!(matches!(message.take_stream(), Err(HostError::Disposed)));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut message = InMemoryMessage::new(b"body".to_vec());
        message.dispose();
        message.dispose();
    }

    #[test]
    fn test_message_from_value_uses_byte_form() {
        let value = MessageValue::base64("aGVsbG8=");
        let mut message = InMemoryMessage::from_value(&value).unwrap();

        let mut stream = message.take_stream().unwrap();
        let mut content = String::new();
        stream.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_context_properties() {
        let ctx = MessageContext::new()
            .with_property("Source", "inbound")
            .with_property(TRANSFORM_IDENTITY_PROPERTY, "copy");

        assert_eq!(ctx.get("Source"), Some("inbound"));
        assert_eq!(ctx.get("Missing"), None);
        assert_eq!(ctx.transform_identity(), Some("copy"));
    }

    #[test]
    fn test_context_without_identity() {
        let ctx = MessageContext::new();
        assert_eq!(ctx.transform_identity(), None);
    }

    #[test]
    fn test_factory_round_trip() {
        let factory = InMemoryMessageFactory::new();
        let ctx = MessageContext::new();

        let mut content = Cursor::new(b"payload".to_vec());
        let mut handle = factory.create_message(&ctx, &mut content).unwrap();

        let mut stream = handle.take_stream().unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).unwrap();
        assert_eq!(body, "payload");
    }
}
