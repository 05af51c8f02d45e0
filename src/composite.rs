//! Composite reader over several underlying streams.
//!
//! Presents any number of readable streams as one continuous byte sequence,
//! in the order they were given. Used to feed several message bodies to a
//! single transformation as one logical input.

use std::io::{self, Read};

/// A reader that chains underlying readers end-to-end.
///
/// Each source is read once, in order, until exhausted; the composite then
/// moves on to the next one. A single linear pass over every source, no
/// buffering beyond what the caller provides.
///
/// # Example
///
/// ```
/// use std::io::{Cursor, Read};
/// use remap::CompositeReader;
///
/// let mut reader = CompositeReader::new(vec![
///     Box::new(Cursor::new(b"left".to_vec())),
///     Box::new(Cursor::new(b"right".to_vec())),
/// ]);
///
/// let mut content = String::new();
/// reader.read_to_string(&mut content).unwrap();
/// assert_eq!(content, "leftright");
/// ```
pub struct CompositeReader {
    sources: Vec<Box<dyn Read + Send>>,
    current: usize,
}

impl CompositeReader {
    /// Create a composite reader over the given sources, in order.
    pub fn new(sources: Vec<Box<dyn Read + Send>>) -> Self {
        Self {
            sources,
            current: 0,
        }
    }

    /// Number of underlying sources, consumed or not.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl Read for CompositeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.current < self.sources.len() {
            let n = self.sources[self.current].read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            // source exhausted, move to the next one
            self.current += 1;
        }
        Ok(0)
    }
}

impl std::fmt::Debug for CompositeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeReader")
            .field("sources", &self.sources.len())
            .field("current", &self.current)
            .finish()
    }
}
