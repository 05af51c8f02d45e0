//! Byte-stream codecs for message values.
//!
//! A formatter translates a [`MessageValue`] to and from a byte stream when
//! the host persists or reloads message content. Formatters are stateless and
//! safe to reuse across any number of serialize/deserialize calls.

use crate::message::{MessageError, MessageValue};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;
use std::io::{Read, Write};

/// Error type for formatter operations
#[derive(Debug)]
pub enum FormatError {
    IoError(std::io::Error),
    MessageError(MessageError),
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::IoError(err)
    }
}

impl From<MessageError> for FormatError {
    fn from(err: MessageError) -> Self {
        FormatError::MessageError(err)
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::IoError(e) => write!(f, "IO error: {}", e),
            FormatError::MessageError(e) => write!(f, "Message error: {}", e),
        }
    }
}

impl std::error::Error for FormatError {}

/// Codec over a byte stream, one per message-value encoding.
///
/// The codec decides the byte form, not the value: the `PlainText` codec
/// writes the UTF-8 encoding of the content, while the `Base64` codec writes
/// the base64-DECODED payload bytes. The wire form of a base64 value is its
/// decoded payload; the base64 text only ever lives in the value's content.
/// Deserialization applies the inverse, so `deserialize(serialize(v))`
/// reconstructs an equivalent value for same-variant codec/value pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormatter {
    PlainText,
    Base64,
}

impl MessageFormatter {
    /// Serialize a message value to a byte stream.
    ///
    /// The stream is written in a single `write_all` call, so there is no
    /// partial write on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the `Base64` codec is given content that is not
    /// valid base64, or if the stream write fails.
    pub fn serialize<W: Write>(
        &self,
        stream: &mut W,
        value: &MessageValue,
    ) -> Result<(), FormatError> {
        let bytes = self.get_bytes(value.content())?;
        stream.write_all(&bytes)?;
        Ok(())
    }

    /// Deserialize a message value from a byte stream.
    ///
    /// Reads the stream to end, then rebuilds the value in this codec's
    /// encoding: `PlainText` UTF-8-decodes the bytes, `Base64` base64-encodes
    /// them.
    pub fn deserialize<R: Read>(&self, stream: &mut R) -> Result<MessageValue, FormatError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        self.set_bytes(bytes)
    }

    fn get_bytes(&self, content: &str) -> Result<Vec<u8>, FormatError> {
        match self {
            MessageFormatter::PlainText => Ok(content.as_bytes().to_vec()),
            MessageFormatter::Base64 => {
                let bytes = BASE64.decode(content).map_err(MessageError::from)?;
                Ok(bytes)
            }
        }
    }

    fn set_bytes(&self, bytes: Vec<u8>) -> Result<MessageValue, FormatError> {
        match self {
            MessageFormatter::PlainText => {
                let content = String::from_utf8(bytes).map_err(MessageError::from)?;
                Ok(MessageValue::plain(content))
            }
            MessageFormatter::Base64 => Ok(MessageValue::base64(BASE64.encode(bytes))),
        }
    }
}
