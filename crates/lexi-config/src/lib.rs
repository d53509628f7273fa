// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! lexi-config: the dictionary configuration model.
//!
//! A [`ConfigTree`] maps document structure to data fields: each
//! [`ConfigNode`] names a field path, a display shape ([`NodeOptions`]),
//! styling and separators, and an ordered list of children. The tree is
//! hand-authored once per dictionary style and read-only while documents
//! are generated from it.
#![forbid(unsafe_code)]

pub mod config;
pub mod options;
pub mod tree;

pub use options::{
    GroupingOptions, ListId, ListOptions, NodeOptions, NumberingStyle, OptionItem, OutlineStyle,
    ParagraphOptions, PictureOptions, SenseOptions, WritingSystemKind, WritingSystemOptions,
};
pub use tree::{ConfigNode, ConfigNodeId, ConfigTree, StyleKind, TreeError};
