//! # Inkstone DOM
//!
//! Host document surface consumed by the editing engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: HostDocument trait                    │
//! │  - node creation, tree queries              │
//! │  - tree and attribute mutation              │
//! │  - live selection                           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ memory: MemoryDocument                      │
//! │  - in-memory implementation of the trait    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serialize / fixture                         │
//! │  - HTML output with ^ and | markers         │
//! │  - marker HTML → MemoryDocument             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The editing engine never looks past the `HostDocument` trait, so any
//! document model offering these primitives can back it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inkstone_dom::{fixture, serialize};
//!
//! let doc = fixture::parse("<p contenteditable>ab|cd</p>")?;
//! assert_eq!(serialize::body_html(&doc), "<p contenteditable>ab|cd</p>");
//! ```

pub mod fixture;
pub mod host;
pub mod memory;
pub mod serialize;

pub use fixture::FixtureError;
pub use host::{HostDocument, HostError, HostNodeId, HostSelection, NodeKind};
pub use memory::MemoryDocument;
