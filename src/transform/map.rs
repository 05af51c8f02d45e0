//! Compiled transform contract.
//!
//! A transform is a compiled mapping applied to one input stream, producing
//! one output stream. Hosts implement [`Transform`] for whatever engine they
//! compile their mappings with; the crate ships a passthrough implementation
//! for plain concatenation.

use crate::host::HostError;
use crate::transform::arguments::ArgumentList;
use std::fmt;
use std::io::{Read, Write};

/// Error type for transform operations
#[derive(Debug)]
pub enum TransformError {
    /// A required parameter was absent or unusable. Caller bug, never retried.
    InvalidArgument(String),
    /// The transform identity could not be resolved.
    NotFound(String),
    /// The transform definition could not be realized into a runnable
    /// transform.
    CompileError { identity: String, reason: String },
    /// The transform failed while running; carries the identity for
    /// diagnostics.
    ExecutionError { identity: String, reason: String },
    HostError(HostError),
    IoError(std::io::Error),
}

impl From<HostError> for TransformError {
    fn from(err: HostError) -> Self {
        TransformError::HostError(err)
    }
}

impl From<std::io::Error> for TransformError {
    fn from(err: std::io::Error) -> Self {
        TransformError::IoError(err)
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            TransformError::NotFound(identity) => {
                write!(f, "Transform not found: {}", identity)
            }
            TransformError::CompileError { identity, reason } => {
                write!(f, "Failed to compile transform '{}': {}", identity, reason)
            }
            TransformError::ExecutionError { identity, reason } => {
                write!(f, "Transform '{}' failed: {}", identity, reason)
            }
            TransformError::HostError(e) => write!(f, "Host error: {}", e),
            TransformError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TransformError {}

/// Trait for compiled transforms.
///
/// An implementation reads the whole input, applies its mapping with the
/// given arguments, and writes UTF-8 output. It never closes the output;
/// the caller owns the buffer and decides when it is complete. Transforms
/// carry no per-call state and are shared across concurrent calls.
pub trait Transform: Send + Sync {
    /// Apply the transform to `input`, writing the result to `output`.
    ///
    /// # Arguments
    ///
    /// * `input` - the collapsed input stream, consumed in a single pass
    /// * `arguments` - merged argument list (defaults overridden by caller)
    /// * `output` - destination for the transformed content
    fn apply(
        &self,
        input: &mut dyn Read,
        arguments: &ArgumentList,
        output: &mut dyn Write,
    ) -> Result<(), TransformError>;
}

/// Function-based implementation of Transform
impl<F> Transform for F
where
    F: Fn(&mut dyn Read, &ArgumentList, &mut dyn Write) -> Result<(), TransformError>
        + Send
        + Sync,
{
    fn apply(
        &self,
        input: &mut dyn Read,
        arguments: &ArgumentList,
        output: &mut dyn Write,
    ) -> Result<(), TransformError> {
        self(input, arguments, output)
    }
}

/// Passthrough transform: copies the input to the output unchanged.
///
/// With a multi-message input this yields the ordered concatenation of every
/// message body. Arguments are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyTransform;

impl Transform for CopyTransform {
    fn apply(
        &self,
        input: &mut dyn Read,
        _arguments: &ArgumentList,
        output: &mut dyn Write,
    ) -> Result<(), TransformError> {
        std::io::copy(input, output)?;
        Ok(())
    }
}
