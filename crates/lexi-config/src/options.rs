// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node-options model: the closed set of display shapes a configuration node
//! can carry.
//!
//! Every dispatch site matches exhaustively on [`NodeOptions`], so adding a
//! shape is a compile error everywhere it is not yet handled.

use serde::{Deserialize, Serialize};

/// Variant configuration payload attached to a [`crate::ConfigNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum NodeOptions {
    /// Choose which writing systems of a multi-string field to show.
    WritingSystem(WritingSystemOptions),
    /// Writing-system selection plus paragraph layout.
    WritingSystemAndParagraph {
        /// Writing-system selection.
        ws: WritingSystemOptions,
        /// Paragraph layout.
        paragraph: ParagraphOptions,
    },
    /// Choose which list items (types, relations) to show and in what order.
    ListSelection(ListOptions),
    /// List selection plus paragraph layout.
    ListAndParagraph {
        /// List selection.
        list: ListOptions,
        /// Paragraph layout.
        paragraph: ParagraphOptions,
    },
    /// Sense numbering and layout.
    Sense(SenseOptions),
    /// Picture sizing and stacking.
    Picture(PictureOptions),
    /// Cosmetic grouping of sibling nodes.
    Grouping(GroupingOptions),
}

impl NodeOptions {
    /// Writing-system selection, when this shape carries one.
    pub fn writing_system_options(&self) -> Option<&WritingSystemOptions> {
        match self {
            Self::WritingSystem(ws) | Self::WritingSystemAndParagraph { ws, .. } => Some(ws),
            Self::ListSelection(_)
            | Self::ListAndParagraph { .. }
            | Self::Sense(_)
            | Self::Picture(_)
            | Self::Grouping(_) => None,
        }
    }

    /// List selection, when this shape carries one.
    pub fn list_options(&self) -> Option<&ListOptions> {
        match self {
            Self::ListSelection(list) | Self::ListAndParagraph { list, .. } => Some(list),
            Self::WritingSystem(_)
            | Self::WritingSystemAndParagraph { .. }
            | Self::Sense(_)
            | Self::Picture(_)
            | Self::Grouping(_) => None,
        }
    }

    /// Sense options, when this is a sense shape.
    pub fn sense_options(&self) -> Option<&SenseOptions> {
        match self {
            Self::Sense(sense) => Some(sense),
            _ => None,
        }
    }

    /// Whether each rendered item should start its own paragraph.
    pub fn display_each_in_paragraph(&self) -> bool {
        match self {
            Self::WritingSystemAndParagraph { paragraph, .. }
            | Self::ListAndParagraph { paragraph, .. } => paragraph.display_each_in_paragraph,
            Self::Sense(sense) => sense.display_each_in_paragraph,
            Self::Grouping(group) => group.display_each_in_paragraph,
            Self::WritingSystem(_) | Self::ListSelection(_) | Self::Picture(_) => false,
        }
    }

    /// `true` for [`NodeOptions::Grouping`].
    pub fn is_grouping(&self) -> bool {
        matches!(self, Self::Grouping(_))
    }

    /// `true` for [`NodeOptions::Picture`].
    pub fn is_picture(&self) -> bool {
        matches!(self, Self::Picture(_))
    }
}

/// One selectable option: an opaque identifier plus its enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    /// Writing-system id, magic token, or list-item id (optionally suffixed
    /// with a `:f` / `:r` direction marker).
    pub id: String,
    /// Whether the option is shown.
    pub enabled: bool,
}

impl OptionItem {
    /// Enabled option for `id`.
    pub fn enabled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
        }
    }

    /// Disabled option for `id`.
    pub fn disabled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: false,
        }
    }
}

/// Which family of writing systems a node draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingSystemKind {
    /// Vernacular writing systems.
    #[default]
    Vernacular,
    /// Analysis writing systems.
    Analysis,
    /// Both vernacular and analysis.
    Both,
    /// Pronunciation writing systems.
    Pronunciation,
    /// Reversal-index writing systems.
    Reversal,
}

/// Writing-system selection for multi-string fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WritingSystemOptions {
    /// Family the options were drawn from.
    pub kind: WritingSystemKind,
    /// Ordered writing-system ids or magic tokens.
    pub options: Vec<OptionItem>,
    /// Prefix each alternative with the writing system's abbreviation.
    #[serde(default)]
    pub display_abbreviations: bool,
}

impl WritingSystemOptions {
    /// Ids of the enabled options, in configured order.
    pub fn enabled_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.options
            .iter()
            .filter(|o| o.enabled)
            .map(|o| o.id.as_str())
    }
}

/// Which possibility list a [`ListOptions`] selects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListId {
    /// Variant entry types.
    Variant,
    /// Complex form types.
    Complex,
    /// Minor-entry types (variant and complex).
    Minor,
    /// Note types.
    Note,
    /// Entry-level lexical relation types.
    Entry,
    /// Sense-level lexical relation types.
    Sense,
    /// No list.
    #[default]
    None,
}

/// Ordered, filterable selection over list items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListOptions {
    /// List the options are drawn from.
    pub list_id: ListId,
    /// Ordered list-item ids.
    pub options: Vec<OptionItem>,
}

impl ListOptions {
    /// Ids of the enabled options, in configured order.
    pub fn enabled_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.options
            .iter()
            .filter(|o| o.enabled)
            .map(|o| o.id.as_str())
    }

    /// Whether `id` is present and enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.enabled && o.id == id)
    }

    /// Whether this selects lexical relation types.
    pub fn is_lexical_relation_list(&self) -> bool {
        matches!(self.list_id, ListId::Entry | ListId::Sense)
    }
}

/// Paragraph layout switches shared by the `*AndParagraph` shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParagraphOptions {
    /// Paragraph style for the first paragraph.
    #[serde(default)]
    pub style: Option<String>,
    /// Paragraph style for continuation paragraphs.
    #[serde(default)]
    pub continuation_style: Option<String>,
    /// Start each item in its own paragraph.
    #[serde(default)]
    pub display_each_in_paragraph: bool,
}

/// Ordinal style applied to a running sense counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberingStyle {
    /// Senses are not numbered.
    #[default]
    #[serde(rename = "")]
    None,
    /// `1, 2, 3`
    #[serde(rename = "%d")]
    Decimal,
    /// `a, b, c`
    #[serde(rename = "%a")]
    LowerAlpha,
    /// `A, B, C`
    #[serde(rename = "%A")]
    UpperAlpha,
    /// `i, ii, iii`
    #[serde(rename = "%i")]
    LowerRoman,
    /// `I, II, III`
    #[serde(rename = "%I")]
    UpperRoman,
}

impl NumberingStyle {
    /// Parses a `%d`-style token; unknown tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "" => Some(Self::None),
            "%d" => Some(Self::Decimal),
            "%a" => Some(Self::LowerAlpha),
            "%A" => Some(Self::UpperAlpha),
            "%i" => Some(Self::LowerRoman),
            "%I" => Some(Self::UpperRoman),
            _ => None,
        }
    }

    /// `true` unless this is [`NumberingStyle::None`].
    pub fn is_numbered(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Maps a 1-based counter to its ordinal text.
    ///
    /// Alphabetic ordinals continue `z, aa, ab, …` past 26; Roman ordinals
    /// fall back to decimal above 3999.
    pub fn format(self, n: usize) -> String {
        match self {
            Self::None => String::new(),
            Self::Decimal => n.to_string(),
            Self::LowerAlpha => alpha(n, b'a'),
            Self::UpperAlpha => alpha(n, b'A'),
            Self::LowerRoman => roman(n).to_lowercase(),
            Self::UpperRoman => roman(n),
        }
    }
}

fn alpha(mut n: usize, base: u8) -> String {
    if n == 0 {
        return String::new();
    }
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        // n % 26 < 26 always fits in a u8
        #[allow(clippy::cast_possible_truncation)]
        out.push(base + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn roman(n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n == 0 || n > 3999 {
        return n.to_string();
    }
    let mut rest = n;
    let mut out = String::new();
    for (value, glyph) in TABLE {
        while rest >= value {
            out.push_str(glyph);
            rest -= value;
        }
    }
    out
}

/// How a sub-sense number is composed with its parent's number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutlineStyle {
    /// Restart: the sub-sense shows only its own ordinal.
    #[default]
    #[serde(rename = "")]
    Reset,
    /// Concatenate parent and own ordinal (`1a`).
    #[serde(rename = "%j")]
    Join,
    /// Dot-join parent and own ordinal (`1.2`).
    #[serde(rename = "%.")]
    Dot,
}

impl OutlineStyle {
    /// Composes the displayed number for a sense nested under `parent`.
    pub fn compose(self, parent: &str, own: &str) -> String {
        if parent.is_empty() {
            return own.to_owned();
        }
        match self {
            Self::Reset => own.to_owned(),
            Self::Join => format!("{parent}{own}"),
            Self::Dot => format!("{parent}.{own}"),
        }
    }
}

/// Sense numbering and layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseOptions {
    /// Ordinal style of the running counter.
    pub numbering_style: NumberingStyle,
    /// Literal text before the number.
    pub before_number: String,
    /// Literal text after the number.
    pub after_number: String,
    /// Character style applied to the number.
    pub number_style: Option<String>,
    /// Composition with the parent sense's number.
    pub parent_number_style: OutlineStyle,
    /// Hoist grammatical info shared by every sense in front of the list.
    pub show_shared_grammar_first: bool,
    /// Each sense in its own paragraph.
    pub display_each_in_paragraph: bool,
    /// Keep the first sense inline when paragraphs are on.
    pub display_first_inline: bool,
    /// Number a sense even when it has no siblings.
    pub number_even_single: bool,
}

/// Picture sizing and stacking.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PictureOptions {
    /// Minimum height in inches.
    pub minimum_height: f32,
    /// Maximum height in inches.
    pub maximum_height: f32,
    /// Minimum width in inches.
    pub minimum_width: f32,
    /// Maximum width in inches.
    pub maximum_width: f32,
    /// Stack multiple pictures vertically.
    pub stack_multiple: bool,
}

// Heights and widths are configuration literals, never NaN.
impl Eq for PictureOptions {}

/// Cosmetic grouping of sibling nodes under a labelled container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingOptions {
    /// Free-text description shown to editors.
    pub description: Option<String>,
    /// Render the group's content as its own paragraph.
    pub display_each_in_paragraph: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn alpha_and_roman_ordinals() {
        let a: Vec<_> = (1..=4).map(|n| NumberingStyle::LowerAlpha.format(n)).collect();
        assert_eq!(a, ["a", "b", "c", "d"]);
        assert_eq!(NumberingStyle::UpperAlpha.format(26), "Z");
        assert_eq!(NumberingStyle::LowerAlpha.format(27), "aa");
        let r: Vec<_> = (1..=5).map(|n| NumberingStyle::LowerRoman.format(n)).collect();
        assert_eq!(r, ["i", "ii", "iii", "iv", "v"]);
        assert_eq!(NumberingStyle::UpperRoman.format(1994), "MCMXCIV");
        assert_eq!(NumberingStyle::Decimal.format(12), "12");
        assert_eq!(NumberingStyle::None.format(3), "");
    }

    #[test]
    fn outline_composition() {
        assert_eq!(OutlineStyle::Join.compose("1", "a"), "1a");
        assert_eq!(OutlineStyle::Dot.compose("1", "2"), "1.2");
        assert_eq!(OutlineStyle::Reset.compose("1", "a"), "a");
        assert_eq!(OutlineStyle::Dot.compose("", "2"), "2");
    }

    #[test]
    fn tokens_round_trip_through_serde() {
        let opts = SenseOptions {
            numbering_style: NumberingStyle::UpperRoman,
            parent_number_style: OutlineStyle::Dot,
            ..SenseOptions::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["numbering_style"], "%I");
        assert_eq!(json["parent_number_style"], "%.");
        assert_eq!(NumberingStyle::from_token("%i"), Some(NumberingStyle::LowerRoman));
        assert_eq!(NumberingStyle::from_token("%x"), None);
    }

    #[test]
    fn shape_accessors() {
        let list = ListOptions {
            list_id: ListId::Sense,
            options: vec![OptionItem::enabled("syn"), OptionItem::disabled("ant")],
        };
        let opts = NodeOptions::ListAndParagraph {
            list: list.clone(),
            paragraph: ParagraphOptions {
                display_each_in_paragraph: true,
                ..ParagraphOptions::default()
            },
        };
        assert_eq!(opts.list_options(), Some(&list));
        assert!(opts.writing_system_options().is_none());
        assert!(opts.display_each_in_paragraph());
        assert!(list.is_enabled("syn"));
        assert!(!list.is_enabled("ant"));
        assert!(list.is_lexical_relation_list());
        assert_eq!(list.enabled_ids().collect::<Vec<_>>(), ["syn"]);
    }
}
