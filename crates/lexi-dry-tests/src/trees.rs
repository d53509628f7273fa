// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node-option shorthands and a baseline dictionary configuration.

use lexi_config::{
    ConfigNode, ConfigNodeId, ConfigTree, ListId, ListOptions, NodeOptions, NumberingStyle,
    OptionItem, OutlineStyle, SenseOptions, TreeError, WritingSystemKind, WritingSystemOptions,
};

fn writing_systems(kind: WritingSystemKind, ids: &[&str]) -> NodeOptions {
    NodeOptions::WritingSystem(WritingSystemOptions {
        kind,
        options: ids.iter().map(|id| OptionItem::enabled(*id)).collect(),
        display_abbreviations: false,
    })
}

/// Vernacular writing-system options over `ids` (ids or magic tokens).
pub fn vernacular(ids: &[&str]) -> NodeOptions {
    writing_systems(WritingSystemKind::Vernacular, ids)
}

/// Analysis writing-system options over `ids` (ids or magic tokens).
pub fn analysis(ids: &[&str]) -> NodeOptions {
    writing_systems(WritingSystemKind::Analysis, ids)
}

/// List options with every id in `ids` enabled, in order.
pub fn list(list_id: ListId, ids: &[String]) -> NodeOptions {
    NodeOptions::ListSelection(ListOptions {
        list_id,
        options: ids.iter().map(|id| OptionItem::enabled(id.clone())).collect(),
    })
}

/// Sense options numbering with `token` (`%d`, `%a`, …; anything else is
/// unnumbered).
pub fn sense_numbering(token: &str) -> SenseOptions {
    SenseOptions {
        numbering_style: NumberingStyle::from_token(token).unwrap_or_default(),
        ..SenseOptions::default()
    }
}

/// Main Entry > Headword, Senses > (Grammatical Info > Category, Gloss,
/// Subsenses > Gloss).
#[derive(Debug, Clone)]
pub struct BasicConfig {
    /// The linked tree.
    pub tree: ConfigTree,
    /// "Main Entry" part.
    pub main: ConfigNodeId,
    /// Entry headword.
    pub headword: ConfigNodeId,
    /// Top-level sense list.
    pub senses: ConfigNodeId,
    /// Grammatical info of a sense.
    pub grammatical_info: ConfigNodeId,
    /// Gloss of a sense.
    pub gloss: ConfigNodeId,
    /// Sub-sense list, lettered and joined to the parent number.
    pub subsenses: ConfigNodeId,
}

impl BasicConfig {
    /// Baseline tree with senses numbered by `numbering`.
    pub fn new(numbering: &str) -> Self {
        let mut tree = ConfigTree::new("Lexeme-based");
        let main = tree.add_part(ConfigNode::new("Main Entry", "LexEntry"));
        let headword = tree.add_child(main, ConfigNode::new("Headword", "HeadWord"));
        let senses = tree.add_child(
            main,
            ConfigNode::new("Senses", "Senses")
                .with_options(NodeOptions::Sense(sense_numbering(numbering))),
        );
        let grammatical_info = tree.add_child(
            senses,
            ConfigNode::new("Grammatical Info", "MorphoSyntaxAnalysis"),
        );
        tree.add_child(
            grammatical_info,
            ConfigNode::new("Category", "InterlinearAbbr").with_options(analysis(&["en"])),
        );
        let gloss = tree.add_child(
            senses,
            ConfigNode::new("Gloss", "Gloss").with_options(analysis(&["en"])),
        );
        let subsenses = tree.add_child(
            senses,
            ConfigNode::new("Subsenses", "Senses").with_options(NodeOptions::Sense(SenseOptions {
                parent_number_style: OutlineStyle::Join,
                ..sense_numbering("%a")
            })),
        );
        tree.add_child(
            subsenses,
            ConfigNode::new("Gloss", "Gloss").with_options(analysis(&["en"])),
        );
        Self {
            tree,
            main,
            headword,
            senses,
            grammatical_info,
            gloss,
            subsenses,
        }
    }

    /// Appends `node` under `parent`.
    pub fn add(&mut self, parent: ConfigNodeId, node: ConfigNode) -> ConfigNodeId {
        self.tree.add_child(parent, node)
    }

    /// Re-runs parent and reference linking after edits.
    pub fn relink(&mut self) -> Result<(), TreeError> {
        self.tree.specify_parents_and_references()
    }
}
