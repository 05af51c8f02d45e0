//! Message value types for text payloads.
//!
//! This module provides the immutable message-value abstraction with two
//! interchangeable encodings: plain text and base64-wrapped text.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;

/// Error type for message content operations
#[derive(Debug)]
pub enum MessageError {
    Base64Error(base64::DecodeError),
    Utf8Error(std::string::FromUtf8Error),
}

impl From<base64::DecodeError> for MessageError {
    fn from(err: base64::DecodeError) -> Self {
        MessageError::Base64Error(err)
    }
}

impl From<std::string::FromUtf8Error> for MessageError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        MessageError::Utf8Error(err)
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::Base64Error(e) => write!(f, "Base64 decode error: {}", e),
            MessageError::Utf8Error(e) => write!(f, "UTF-8 decode error: {}", e),
        }
    }
}

impl std::error::Error for MessageError {}

/// An immutable text payload to send through a transformation step.
///
/// Two variants cover the two supported content encodings:
///
/// * `Plain` - content is used verbatim as UTF-8 text
/// * `Base64` - content is base64 text; the payload is its decoded form
///
/// Construction goes through the named constructors [`MessageValue::plain`]
/// and [`MessageValue::base64`]; there is deliberately no blanket string
/// conversion, so call sites always state which encoding they mean.
/// Base64 well-formedness is only checked when the content is decoded.
///
/// # Example
///
/// ```
/// use remap::MessageValue;
///
/// let value = MessageValue::base64("aGVsbG8=");
/// assert_eq!(value.content(), "aGVsbG8=");
/// assert_eq!(value.render().unwrap(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValue {
    Plain(String),
    Base64(String),
}

impl MessageValue {
    /// Create a plain-text message value.
    pub fn plain(content: impl Into<String>) -> Self {
        MessageValue::Plain(content.into())
    }

    /// Create a base64-wrapped message value.
    ///
    /// The content is stored as given; it is not validated here. A malformed
    /// base64 string surfaces as an error from [`MessageValue::render`] or
    /// [`MessageValue::to_bytes`].
    pub fn base64(content: impl Into<String>) -> Self {
        MessageValue::Base64(content.into())
    }

    /// Get the stored content string, regardless of variant.
    ///
    /// For `Base64` this is the base64 text itself, not the decoded payload.
    pub fn content(&self) -> &str {
        match self {
            MessageValue::Plain(content) => content,
            MessageValue::Base64(content) => content,
        }
    }

    /// Render the value as readable text.
    ///
    /// # Returns
    ///
    /// * `Plain` - the content unchanged
    /// * `Base64` - the UTF-8 text obtained by base64-decoding the content
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid base64 or the decoded
    /// bytes are not valid UTF-8.
    pub fn render(&self) -> Result<String, MessageError> {
        match self {
            MessageValue::Plain(content) => Ok(content.clone()),
            MessageValue::Base64(content) => {
                let bytes = BASE64.decode(content)?;
                Ok(String::from_utf8(bytes)?)
            }
        }
    }

    /// Get the byte form of the payload.
    ///
    /// `Plain` yields the UTF-8 encoding of the content; `Base64` yields the
    /// base64-decoded bytes. The byte form of a base64 value is its decoded
    /// payload, never the base64 text itself.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        match self {
            MessageValue::Plain(content) => Ok(content.as_bytes().to_vec()),
            MessageValue::Base64(content) => Ok(BASE64.decode(content)?),
        }
    }

    /// Check whether this is a base64-wrapped value.
    pub fn is_base64(&self) -> bool {
        matches!(self, MessageValue::Base64(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render() {
        let value = MessageValue::plain("hello world");
        assert_eq!(value.content(), "hello world");
        assert_eq!(value.render().unwrap(), "hello world");
    }

    #[test]
    fn test_base64_render() {
        // "message payload" in base64
        let value = MessageValue::base64("bWVzc2FnZSBwYXlsb2Fk");
        assert_eq!(value.content(), "bWVzc2FnZSBwYXlsb2Fk");
        assert_eq!(value.render().unwrap(), "message payload");
    }

    #[test]
    fn test_base64_render_invalid_content() {
        let value = MessageValue::base64("not base64!");
        let result = value.render();
        assert!(matches!(result, Err(MessageError::Base64Error(_))));
    }

    #[test]
    fn test_base64_render_non_utf8_payload() {
        // 0xFF 0xFE is valid base64 payload but not valid UTF-8
        let value = MessageValue::base64("//4=");
        let result = value.render();
        assert!(matches!(result, Err(MessageError::Utf8Error(_))));
    }

    #[test]
    fn test_to_bytes_plain() {
        let value = MessageValue::plain("abc");
        assert_eq!(value.to_bytes().unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_to_bytes_base64_yields_decoded_payload() {
        let value = MessageValue::base64("aGVsbG8=");
        assert_eq!(value.to_bytes().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(MessageValue::plain("a"), MessageValue::plain("a"));
        assert_ne!(MessageValue::plain("a"), MessageValue::plain("b"));
        // same content, different variant
        assert_ne!(MessageValue::plain("aGVsbG8="), MessageValue::base64("aGVsbG8="));
    }

    #[test]
    fn test_construction_is_not_validated() {
        // malformed base64 is accepted at construction time
        let value = MessageValue::base64("???");
        assert_eq!(value.content(), "???");
        assert!(value.render().is_err());
    }
}
