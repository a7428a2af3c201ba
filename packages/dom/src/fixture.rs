//! Marker HTML fixtures.
//!
//! Parses a small HTML subset into a [`MemoryDocument`] body and turns the
//! `^` (anchor) and `|` (focus) markers into the document selection. A lone
//! `|` is a caret. A marker inside text addresses the text node; a marker
//! between tags addresses the enclosing element.
//!
//! Supported: elements, quoted and bare attributes, void elements, `/>`,
//! and the `&amp; &lt; &gt; &quot;` entities.

use crate::host::{HostDocument, HostError, HostNodeId, HostSelection};
use crate::serialize::is_void_element;
use crate::MemoryDocument;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixtureError {
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Closing tag </{found}> does not match <{expected}>")]
    MismatchedTag { expected: String, found: String },

    #[error("Closing tag </{0}> without an open element")]
    UnexpectedCloseTag(String),

    #[error("Marker {0:?} appears more than once")]
    DuplicateMarker(char),

    #[error("Anchor marker without a focus marker")]
    MissingFocus,

    #[error("Unknown entity &{0};")]
    UnknownEntity(String),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Anchor,
    Focus,
}

impl Marker {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '^' => Some(Marker::Anchor),
            '|' => Some(Marker::Focus),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Marker::Anchor => '^',
            Marker::Focus => '|',
        }
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    doc: MemoryDocument,
    open: Vec<(HostNodeId, String)>,
    text: String,
    pending: Vec<(Marker, usize)>,
    anchor: Option<(HostNodeId, usize)>,
    focus: Option<(HostNodeId, usize)>,
}

/// Parse `source` into a fresh document. The content becomes the children
/// of the document body.
pub fn parse(source: &str) -> Result<MemoryDocument, FixtureError> {
    let doc = MemoryDocument::new();
    let body = doc.body();
    let mut parser = Parser {
        chars: source.chars().peekable(),
        doc,
        open: vec![(body, "body".to_string())],
        text: String::new(),
        pending: Vec::new(),
        anchor: None,
        focus: None,
    };
    parser.run()?;
    parser.finish()
}

impl<'a> Parser<'a> {
    fn current(&self) -> HostNodeId {
        self.open.last().map(|(id, _)| *id).unwrap_or(self.doc.body())
    }

    fn run(&mut self) -> Result<(), FixtureError> {
        while let Some(ch) = self.chars.next() {
            match ch {
                '<' => {
                    self.flush_text()?;
                    if self.chars.peek() == Some(&'/') {
                        self.chars.next();
                        self.close_tag()?;
                    } else {
                        self.open_tag()?;
                    }
                }
                '&' => {
                    let decoded = self.entity()?;
                    self.text.push(decoded);
                }
                _ => match Marker::from_char(ch) {
                    Some(marker) if self.text.is_empty() => {
                        let position = (self.current(), self.doc.child_nodes(self.current()).len());
                        self.record(marker, position)?;
                    }
                    Some(marker) => self.pending.push((marker, self.text.chars().count())),
                    None => self.text.push(ch),
                },
            }
        }
        self.flush_text()?;
        if self.open.len() > 1 {
            return Err(FixtureError::UnexpectedEof);
        }
        Ok(())
    }

    fn record(&mut self, marker: Marker, position: (HostNodeId, usize)) -> Result<(), FixtureError> {
        let slot = match marker {
            Marker::Anchor => &mut self.anchor,
            Marker::Focus => &mut self.focus,
        };
        if slot.is_some() {
            return Err(FixtureError::DuplicateMarker(marker.as_char()));
        }
        *slot = Some(position);
        Ok(())
    }

    fn flush_text(&mut self) -> Result<(), FixtureError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        let node = self.doc.append_text(self.current(), &text)?;
        for (marker, offset) in std::mem::take(&mut self.pending) {
            self.record(marker, (node, offset))?;
        }
        Ok(())
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' {
                name.push(ch.to_ascii_lowercase());
                self.chars.next();
            } else {
                break;
            }
        }
        name
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(ch) if ch.is_whitespace()) {
            self.chars.next();
        }
    }

    fn open_tag(&mut self) -> Result<(), FixtureError> {
        let tag = self.read_name();
        let element = self.doc.append_element(self.current(), &tag, &[])?;
        loop {
            self.skip_whitespace();
            match self.chars.next() {
                None => return Err(FixtureError::UnexpectedEof),
                Some('>') => break,
                Some('/') => {
                    self.skip_whitespace();
                    if self.chars.next() != Some('>') {
                        return Err(FixtureError::UnexpectedEof);
                    }
                    return Ok(());
                }
                Some(first) => {
                    let mut name = first.to_ascii_lowercase().to_string();
                    name.push_str(&self.read_name());
                    self.skip_whitespace();
                    let value = if self.chars.peek() == Some(&'=') {
                        self.chars.next();
                        self.skip_whitespace();
                        self.attribute_value()?
                    } else {
                        String::new()
                    };
                    self.doc.set_attribute(element, &name, &value)?;
                }
            }
        }
        if !is_void_element(&tag) {
            self.open.push((element, tag));
        }
        Ok(())
    }

    fn attribute_value(&mut self) -> Result<String, FixtureError> {
        let mut value = String::new();
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                loop {
                    match self.chars.next() {
                        None => return Err(FixtureError::UnexpectedEof),
                        Some(ch) if ch == quote => break,
                        Some('&') => value.push(self.entity()?),
                        Some(ch) => value.push(ch),
                    }
                }
            }
            _ => {
                while let Some(&ch) = self.chars.peek() {
                    if ch.is_whitespace() || ch == '>' || ch == '/' {
                        break;
                    }
                    value.push(ch);
                    self.chars.next();
                }
            }
        }
        Ok(value)
    }

    fn close_tag(&mut self) -> Result<(), FixtureError> {
        let tag = self.read_name();
        self.skip_whitespace();
        if self.chars.next() != Some('>') {
            return Err(FixtureError::UnexpectedEof);
        }
        if self.open.len() <= 1 {
            return Err(FixtureError::UnexpectedCloseTag(tag));
        }
        let (_, expected) = self.open.pop().ok_or(FixtureError::UnexpectedEof)?;
        if expected != tag {
            return Err(FixtureError::MismatchedTag { expected, found: tag });
        }
        Ok(())
    }

    fn entity(&mut self) -> Result<char, FixtureError> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                None => return Err(FixtureError::UnexpectedEof),
                Some(';') => break,
                Some(ch) => name.push(ch),
            }
        }
        match name.as_str() {
            "amp" => Ok('&'),
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "quot" => Ok('"'),
            _ => Err(FixtureError::UnknownEntity(name)),
        }
    }

    fn finish(mut self) -> Result<MemoryDocument, FixtureError> {
        let selection = match (self.anchor, self.focus) {
            (None, None) => None,
            (Some(_), None) => return Err(FixtureError::MissingFocus),
            (None, Some((node, offset))) => Some(HostSelection::caret(node, offset)),
            (Some((anchor_node, anchor_offset)), Some((focus_node, focus_offset))) => {
                Some(HostSelection {
                    anchor_node,
                    anchor_offset,
                    focus_node,
                    focus_offset,
                })
            }
        };
        self.doc.set_selection(selection);
        Ok(self.doc)
    }
}
