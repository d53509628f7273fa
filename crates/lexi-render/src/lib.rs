// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! lexi-render: configuration-driven dictionary rendering.
//!
//! Given a lexicon reachable through a [`FieldAccessor`] and a linked
//! [`lexi_config::ConfigTree`], renders entries into XHTML. Each entry is
//! rendered independently by a [`Generator`]; [`render_document`] fans
//! entries out over scoped worker threads and stitches the fragments back
//! together in input order, so output is byte-identical regardless of the
//! worker count.
//!
//! The configuration tree must have been linked with
//! [`lexi_config::ConfigTree::specify_parents_and_references`] before it is
//! handed to a render.
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod document;
pub mod error;
pub mod generator;
pub mod ident;
pub mod letters;
pub mod markup;
pub mod options;
pub mod output;
pub mod pagination;
pub mod ports;
pub mod resolver;
pub mod schema;
pub mod value;

pub use dispatch::{parallel_map_ordered, pool_size, DispatchFailure, ProgressHandle, MAX_WORKERS};
pub use document::{render_document, render_document_to, stylesheet_fragment, Document};
pub use error::RenderError;
pub use generator::{Generator, RenderState, SenseRenderState};
pub use ident::{Guid, ObjectId};
pub use options::RenderOptions;
pub use output::{create_unique, write_document};
pub use pagination::{compute_pages, merge_from_neighbor, Neighbor, PageRange};
pub use ports::{
    FieldAccessor, FieldKind, FileService, FileServiceError, MediaKind, ObjectKind,
    PublicationFilter, RenderEnvironment, StyleResolver, WritingSystem, WritingSystemRegistry,
};
pub use resolver::{Direction, FieldResolver, RelationRef, ResolveError, Resolved, ResolvedKind};
pub use value::{CalendarDate, FileRef, GenDate, GenDatePrecision, MultiString, Run, TsString, Value};
