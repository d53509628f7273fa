// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Letter headings between runs of entries that share a first letter.
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::ident::ObjectId;
use crate::markup::{escape, Tag};
use crate::ports::RenderEnvironment;

/// First letter of `headword` in NFC: the longest matching multigraph from
/// `digraphs`, else the first character with its combining marks. Leading
/// punctuation and spaces are skipped.
pub fn first_letter(headword: &str, digraphs: &[String]) -> Option<String> {
    let text: String = headword.nfc().collect();
    let start = text.char_indices().find(|(_, c)| c.is_alphanumeric())?.0;
    let rest = &text[start..];
    let folded = rest.to_lowercase();

    let mut candidates: Vec<String> = digraphs.iter().map(|d| d.nfc().collect()).collect();
    candidates.sort_by_key(|d: &String| std::cmp::Reverse(d.chars().count()));
    for digraph in candidates.iter().filter(|d| !d.is_empty()) {
        if folded.starts_with(&digraph.to_lowercase()) {
            let letter: String = rest.chars().take(digraph.chars().count()).collect();
            return Some(letter);
        }
    }

    let mut chars = rest.chars();
    let mut letter = String::from(chars.next()?);
    letter.extend(chars.take_while(|c| is_combining_mark(*c)));
    Some(letter.nfc().collect())
}

/// `Ch ch`-style heading text: title case, then lower case when different.
pub fn heading_text(letter: &str) -> String {
    let lower = letter.to_lowercase();
    let mut chars = lower.chars();
    let title: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    if title == lower {
        title
    } else {
        format!("{title} {lower}")
    }
}

/// Heading markup for `letter` in writing system `ws`.
pub fn letter_heading(letter: &str, ws: &str) -> String {
    let inner = Tag::span()
        .class("letter")
        .attr("lang", ws)
        .wrap(&escape(&heading_text(letter)));
    format!("{}\n", Tag::div().class("letHead").wrap(&inner))
}

/// Emits a heading whenever the first letter changes.
#[derive(Debug, Clone, Default)]
pub struct LetterTracker {
    last: Option<String>,
}

impl LetterTracker {
    /// Tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading to place before `entry`, if its letter differs from the
    /// previous entry's.
    pub fn observe(&mut self, env: &RenderEnvironment<'_>, entry: ObjectId) -> Option<String> {
        let headword = env.accessor.headword(entry);
        let ws = headword.first_ws().unwrap_or_default().to_owned();
        let digraphs = env.writing_systems.digraphs(&ws);
        let letter = first_letter(&headword.text(), &digraphs)?;
        let key = letter.to_lowercase();
        if self.last.as_deref() == Some(key.as_str()) {
            return None;
        }
        self.last = Some(key);
        Some(letter_heading(&letter, &ws))
    }
}
