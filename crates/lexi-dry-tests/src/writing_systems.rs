// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writing-system registry fake.

use std::collections::HashMap;

use lexi_render::ports::magic;
use lexi_render::{WritingSystem, WritingSystemRegistry};

/// Registry with vernacular `fr` and `ar` (right-to-left), analysis `en`
/// and `es`, and pronunciation `fr-fonipa`.
#[derive(Debug, Clone)]
pub struct FakeWritingSystems {
    systems: Vec<WritingSystem>,
    vernacular: Vec<String>,
    analysis: Vec<String>,
    pronunciation: Vec<String>,
    digraphs: HashMap<String, Vec<String>>,
}

fn ws(id: &str, abbreviation: &str, font: &str, right_to_left: bool) -> WritingSystem {
    WritingSystem {
        id: id.to_owned(),
        abbreviation: abbreviation.to_owned(),
        language_tag: id.to_owned(),
        default_font: font.to_owned(),
        right_to_left,
    }
}

impl Default for FakeWritingSystems {
    fn default() -> Self {
        Self {
            systems: vec![
                ws("fr", "Fr", "Charis SIL", false),
                ws("ar", "Ar", "Scheherazade", true),
                ws("en", "Eng", "Times New Roman", false),
                ws("es", "Spa", "Times New Roman", false),
                ws("fr-fonipa", "IPA", "Doulos SIL", false),
            ],
            vernacular: vec!["fr".into(), "ar".into()],
            analysis: vec!["en".into(), "es".into()],
            pronunciation: vec!["fr-fonipa".into()],
            digraphs: HashMap::new(),
        }
    }
}

impl FakeWritingSystems {
    /// The standard five writing systems.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers multigraphs that sort as single letters in `ws`.
    pub fn with_digraphs(mut self, ws: &str, digraphs: &[&str]) -> Self {
        self.digraphs
            .insert(ws.to_owned(), digraphs.iter().map(|d| (*d).to_owned()).collect());
        self
    }

    fn first(list: &[String]) -> Vec<String> {
        list.iter().take(1).cloned().collect()
    }
}

impl WritingSystemRegistry for FakeWritingSystems {
    fn resolve(&self, token: &str) -> Vec<String> {
        match token {
            magic::VERNACULAR => Self::first(&self.vernacular),
            magic::ANALYSIS => Self::first(&self.analysis),
            magic::PRONUNCIATION => Self::first(&self.pronunciation),
            magic::BEST_VERNACULAR => self.vernacular.clone(),
            magic::BEST_ANALYSIS => self.analysis.clone(),
            magic::BEST_VERNACULAR_OR_ANALYSIS => {
                self.vernacular.iter().chain(&self.analysis).cloned().collect()
            }
            magic::BEST_ANALYSIS_OR_VERNACULAR => {
                self.analysis.iter().chain(&self.vernacular).cloned().collect()
            }
            id if self.systems.iter().any(|w| w.id == id) => vec![id.to_owned()],
            _ => Vec::new(),
        }
    }

    fn writing_system(&self, id: &str) -> Option<&WritingSystem> {
        self.systems.iter().find(|w| w.id == id)
    }

    fn all(&self) -> Vec<&WritingSystem> {
        self.systems.iter().collect()
    }

    fn digraphs(&self, ws: &str) -> Vec<String> {
        self.digraphs.get(ws).cloned().unwrap_or_default()
    }
}
