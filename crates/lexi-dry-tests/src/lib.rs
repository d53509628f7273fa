// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for lexi crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory settings store fake
//! - [`lexicon`] - In-memory lexicon implementing `FieldAccessor`
//! - [`services`] - Publication filter, media and style fakes
//! - [`trees`] - Node-option shorthands and a baseline dictionary configuration
//! - [`writing_systems`] - Writing-system registry fake

pub mod config;
pub mod lexicon;
pub mod services;
pub mod trees;
pub mod writing_systems;

pub use config::InMemoryConfigStore;
pub use lexicon::{InMemoryLexicon, ENTRY_CLASS, SENSE_CLASS};
pub use services::{ExcludeSet, FixedStyles, RecordingFiles};
pub use trees::{analysis, list, sense_numbering, vernacular, BasicConfig};
pub use writing_systems::FakeWritingSystems;
