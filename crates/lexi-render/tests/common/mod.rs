// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::panic)]

use lexi_config::{ConfigNodeId, ConfigTree};
use lexi_dry_tests::{FakeWritingSystems, InMemoryLexicon};
use lexi_render::{FieldAccessor, Generator, ObjectId, RenderEnvironment, RenderOptions};

/// Routes `tracing` output through the test harness; safe to call twice.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Renders one entry with a fresh generator.
pub fn render_entry(
    env: RenderEnvironment<'_>,
    tree: &ConfigTree,
    options: &RenderOptions,
    entry: ObjectId,
) -> String {
    Generator::new(env, tree, options)
        .generate_entry(entry)
        .expect("entry renders")
}

/// Renders one entry with default options and no services.
pub fn render(lex: &InMemoryLexicon, ws: &FakeWritingSystems, tree: &ConfigTree, entry: ObjectId) -> String {
    render_entry(RenderEnvironment::new(lex, ws), tree, &RenderOptions::default(), entry)
}

/// `g`-prefixed anchor of `obj`.
pub fn anchor(lex: &InMemoryLexicon, obj: ObjectId) -> String {
    lex.guid(obj).anchor()
}

/// Option id a list uses for `obj` (its GUID).
pub fn option_id(lex: &InMemoryLexicon, obj: ObjectId) -> String {
    lex.guid(obj).to_string()
}

/// Non-overlapping occurrences of `needle`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Byte offset of `needle`, panicking with the haystack when absent.
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in:\n{haystack}"))
}

/// `>text<`: text as the whole content of an element.
pub fn text(s: &str) -> String {
    format!(">{s}<")
}

/// Drops every node except `keep` from the node's parent's enabled set.
pub fn only_children(tree: &mut ConfigTree, parent: ConfigNodeId, keep: &[ConfigNodeId]) {
    for child in tree.children(parent).to_vec() {
        tree[child].enabled = keep.contains(&child);
    }
}
