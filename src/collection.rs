//! Ordered collection of host messages with a collapsible input stream.
//!
//! Gathers the messages that feed a single transformation call and presents
//! them as one logical readable stream. The collection owns its handles for
//! disposal and releases each of them exactly once, whether the call
//! succeeds or fails.

use crate::composite::CompositeReader;
use crate::host::{HostError, MessageHandle};
use std::io::{self, Read};

/// An ordered sequence of opaque message handles.
///
/// Built per transformation call, collapsed into a single input stream, and
/// disposed once the call is over. Dropping the collection disposes whatever
/// is left, so cleanup happens on every exit path.
///
/// # Example
///
/// ```
/// use remap::{InMemoryMessage, MessageCollection, MessageValue};
/// use std::io::Read;
///
/// let mut messages = MessageCollection::new();
/// messages.add(Box::new(InMemoryMessage::from_value(&MessageValue::plain("A")).unwrap()));
/// messages.add(Box::new(InMemoryMessage::from_value(&MessageValue::plain("B")).unwrap()));
///
/// let mut input = messages.collapse().unwrap();
/// let mut content = String::new();
/// input.read_to_string(&mut content).unwrap();
/// assert_eq!(content, "AB");
/// ```
#[derive(Default)]
pub struct MessageCollection {
    messages: Vec<Box<dyn MessageHandle>>,
}

impl MessageCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a collection from handles, preserving the given order.
    pub fn from_handles(handles: Vec<Box<dyn MessageHandle>>) -> Self {
        Self { messages: handles }
    }

    /// Append a message handle at the end of the collection.
    pub fn add(&mut self, handle: Box<dyn MessageHandle>) {
        self.messages.push(handle);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Collapse the collection into a single readable input stream.
    ///
    /// * empty collection - an empty stream, not an error
    /// * one element - that element's own stream, unmodified
    /// * two or more - a [`CompositeReader`] over every element's stream in
    ///   insertion order
    ///
    /// The handles stay in the collection afterwards so that
    /// [`MessageCollection::dispose`] can still release them.
    pub fn collapse(&mut self) -> Result<Box<dyn Read + Send>, HostError> {
        match self.messages.len() {
            0 => Ok(Box::new(io::empty())),
            1 => self.messages[0].take_stream(),
            _ => {
                let mut sources = Vec::with_capacity(self.messages.len());
                for message in &mut self.messages {
                    sources.push(message.take_stream()?);
                }
                Ok(Box::new(CompositeReader::new(sources)))
            }
        }
    }

    /// Release every contained handle.
    ///
    /// Handle disposal is idempotent, so disposing the collection twice, or
    /// disposing a collection holding already-released handles, is harmless.
    pub fn dispose(&mut self) {
        for message in &mut self.messages {
            message.dispose();
        }
    }
}

impl Drop for MessageCollection {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for MessageCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCollection")
            .field("len", &self.messages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryMessage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn message(body: &[u8]) -> Box<dyn MessageHandle> {
        Box::new(InMemoryMessage::new(body.to_vec()))
    }

    fn read_all(mut stream: Box<dyn Read + Send>) -> String {
        let mut content = String::new();
        stream.read_to_string(&mut content).unwrap();
        content
    }

    /// Handle that counts effective disposals, for release-exactly-once checks.
    struct CountingMessage {
        inner: InMemoryMessage,
        disposed: bool,
        disposals: Arc<AtomicUsize>,
    }

    impl CountingMessage {
        fn new(disposals: Arc<AtomicUsize>) -> Self {
            Self {
                inner: InMemoryMessage::new(b"x".to_vec()),
                disposed: false,
                disposals,
            }
        }
    }

    impl MessageHandle for CountingMessage {
        fn take_stream(&mut self) -> Result<Box<dyn Read + Send>, HostError> {
            self.inner.take_stream()
        }

        fn dispose(&mut self) {
            if !self.disposed {
                self.disposed = true;
                self.disposals.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.dispose();
        }
    }

    #[test]
    fn test_collapse_empty_collection() {
        let mut messages = MessageCollection::new();
        assert!(messages.is_empty());
        assert_eq!(read_all(messages.collapse().unwrap()), "");
    }

    #[test]
    fn test_collapse_single_element_yields_own_stream() {
        let mut messages = MessageCollection::from_handles(vec![message(b"solo")]);
        assert_eq!(messages.len(), 1);
        assert_eq!(read_all(messages.collapse().unwrap()), "solo");
    }

    #[test]
    fn test_collapse_concatenates_in_insertion_order() {
        let mut messages = MessageCollection::new();
        messages.add(message(b"first"));
        messages.add(message(b"second"));
        messages.add(message(b"third"));

        assert_eq!(read_all(messages.collapse().unwrap()), "firstsecondthird");
    }

    #[test]
    fn test_dispose_releases_each_handle_once() {
        let disposals = Arc::new(AtomicUsize::new(0));
        let mut messages = MessageCollection::new();
        for _ in 0..3 {
            messages.add(Box::new(CountingMessage::new(disposals.clone())));
        }

        messages.dispose();
        drop(messages);
        assert_eq!(disposals.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut messages = MessageCollection::from_handles(vec![message(b"a"), message(b"b")]);
        messages.dispose();
        messages.dispose();
    }

    #[test]
    fn test_dispose_with_already_released_handle() {
        let mut handle = InMemoryMessage::new(b"a".to_vec());
        handle.dispose();

        let mut messages = MessageCollection::from_handles(vec![Box::new(handle), message(b"b")]);
        messages.dispose();
    }

    #[test]
    fn test_drop_disposes_remaining_handles() {
        let disposals = Arc::new(AtomicUsize::new(0));
        {
            let mut messages = MessageCollection::new();
            messages.add(Box::new(CountingMessage::new(disposals.clone())));
            let _ = messages.collapse();
            // dropped without an explicit dispose
        }
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
    }
}
