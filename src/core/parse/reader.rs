//! Streaming XML event reader
//!
//! Wraps the `quick-xml` async reader and reduces its event vocabulary to the
//! three events the annotation state machine understands. Memory use is
//! bounded by the largest single event, not by document size.

use quick_xml::events::{BytesStart, Event as RawEvent};
use quick_xml::Reader;
use std::str;
use tokio::io::AsyncBufRead;

use crate::domain::{IngestError, Result};

/// A single markup event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element opened; names are qualified (`prefix:local`) as written
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// An element closed
    End { name: String },
    /// Trimmed, unescaped character data; never empty
    Text(String),
}

impl XmlEvent {
    /// Value of the named attribute on a start event, compared case-insensitively
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            Self::Start { attributes, .. } => find_attribute(attributes, key),
            _ => None,
        }
    }
}

/// Looks up an attribute by qualified name, ignoring ASCII case
pub fn find_attribute<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

/// Pull-based reader yielding [`XmlEvent`]s from any async buffered source.
///
/// A self-closing element yields `Start` immediately followed by `End`.
/// Reaching end of input while elements are still open, or without having
/// seen any element, is reported as a parse error.
pub struct EventReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_end: Option<String>,
    depth: usize,
    seen_element: bool,
}

impl<R: AsyncBufRead + Unpin> EventReader<R> {
    /// Creates a reader over the given source
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        Self {
            reader,
            buf: Vec::with_capacity(4096),
            pending_end: None,
            depth: 0,
            seen_element: false,
        }
    }

    /// Byte offset of the reader in the input
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Current element nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reads the next event; `Ok(None)` marks a well-formed end of document
    pub async fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(name) = self.pending_end.take() {
            self.depth -= 1;
            return Ok(Some(XmlEvent::End { name }));
        }

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into_async(&mut self.buf).await {
                Ok(event) => event,
                Err(err) => {
                    return Err(IngestError::parse(
                        self.reader.error_position() as u64,
                        err.to_string(),
                    ))
                }
            };

            let position = self.reader.buffer_position() as u64;
            let parsed = match event {
                RawEvent::Start(ref e) => {
                    let (name, attributes) = element_parts(e, position)?;
                    self.depth += 1;
                    self.seen_element = true;
                    Some(XmlEvent::Start { name, attributes })
                }
                RawEvent::Empty(ref e) => {
                    let (name, attributes) = element_parts(e, position)?;
                    self.depth += 1;
                    self.seen_element = true;
                    self.pending_end = Some(name.clone());
                    Some(XmlEvent::Start { name, attributes })
                }
                RawEvent::End(ref e) => {
                    let name = utf8(e.name().as_ref(), position)?;
                    self.depth = self.depth.saturating_sub(1);
                    Some(XmlEvent::End { name })
                }
                RawEvent::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| IngestError::parse(position, err.to_string()))?;
                    non_empty(&text)
                }
                RawEvent::CData(ref e) => {
                    let text = utf8(e.as_ref(), position)?;
                    non_empty(&text)
                }
                RawEvent::Eof => {
                    if self.depth > 0 {
                        return Err(IngestError::parse(
                            position,
                            format!(
                                "unexpected end of document with {} element(s) still open",
                                self.depth
                            ),
                        ));
                    }
                    if !self.seen_element {
                        return Err(IngestError::parse(
                            position,
                            "document contains no elements",
                        ));
                    }
                    return Ok(None);
                }
                // Declarations, comments, processing instructions and doctypes
                _ => None,
            };

            if let Some(event) = parsed {
                return Ok(Some(event));
            }
        }
    }
}

fn element_parts(e: &BytesStart<'_>, position: u64) -> Result<(String, Vec<(String, String)>)> {
    let name = utf8(e.name().as_ref(), position)?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| IngestError::parse(position, err.to_string()))?;
        let key = utf8(attr.key.as_ref(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|err| IngestError::parse(position, err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok((name, attributes))
}

fn utf8(bytes: &[u8], position: u64) -> Result<String> {
    str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|err| IngestError::parse(position, err.to_string()))
}

fn non_empty(text: &str) -> Option<XmlEvent> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(XmlEvent::Text(trimmed.to_string()))
    }
}
