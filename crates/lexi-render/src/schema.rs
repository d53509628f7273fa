// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Field names and object shapes the rendering algorithms rely on.
//!
//! A [`crate::FieldAccessor`] serving a lexicon must expose these fields on
//! the relevant classes for sense numbering, type factoring and
//! cross-references to work. Everything else is reached purely through
//! configured field paths.
use crate::ident::ObjectId;
use crate::ports::FieldAccessor;
use crate::value::Value;

/// Senses of an entry, or sub-senses of a sense.
pub const SENSES: &str = "Senses";
/// Grammatical info of a sense.
pub const GRAMMATICAL_INFO: &str = "MorphoSyntaxAnalysis";
/// Variant and complex-form references owned by an entry.
pub const ENTRY_REFS: &str = "EntryRefs";
/// On an entry ref: `1` for a complex-form ref, `0` for a variant ref.
pub const REF_TYPE: &str = "RefType";
/// On an entry ref: complex form types.
pub const COMPLEX_ENTRY_TYPES: &str = "ComplexEntryTypes";
/// On an entry ref: variant types.
pub const VARIANT_ENTRY_TYPES: &str = "VariantEntryTypes";
/// On an entry ref: the components a complex form is built from.
pub const COMPONENT_LEXEMES: &str = "ComponentLexemes";
/// On an entry ref: the primary components (subentry owners).
pub const PRIMARY_LEXEMES: &str = "PrimaryLexemes";
/// On an entry: entry refs that make it a complex form or variant.
pub const MAIN_ENTRY_REFS: &str = "MainEntryRefs";
/// Prefix of every subentry collection field.
pub const SUBENTRIES_PREFIX: &str = "Subentries";
/// On a lexical relation: its relation type.
pub const OWNER_TYPE: &str = "OwnerType";
/// Configuration field path of a cross-reference's target list.
pub const CONFIG_TARGETS: &str = "ConfigTargets";
/// On a lexical relation: the related entries or senses.
pub const TARGETS: &str = "Targets";
/// On a relation type: its [`MappingKind`] code.
pub const MAPPING_TYPE: &str = "MappingType";
/// Prefix turning a relation-type field into its reverse-direction name.
pub const REVERSE_PREFIX: &str = "Reverse";

/// Fields that render as the headword and therefore link to their entry.
pub const HEADWORD_FIELDS: &[&str] = &["HeadWord", "MLHeadWord", "HeadWordRef", "HeadWordRefs"];

/// How a relation type relates its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingKind {
    /// Every target relates to every other the same way (synonyms).
    #[default]
    Symmetric,
    /// First target differs from the rest (whole/part).
    Asymmetric,
    /// Only meaningful from the first target outward.
    Unidirectional,
    /// Ordered series (calendar months).
    Sequence,
}

impl MappingKind {
    /// Decodes the [`MAPPING_TYPE`] integer; unknown codes are symmetric.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Asymmetric,
            2 => Self::Unidirectional,
            3 => Self::Sequence,
            _ => Self::Symmetric,
        }
    }

    /// The [`MAPPING_TYPE`] integer for this kind.
    pub fn code(self) -> i64 {
        match self {
            Self::Symmetric => 0,
            Self::Asymmetric => 1,
            Self::Unidirectional => 2,
            Self::Sequence => 3,
        }
    }

    /// Whether relation direction matters for this kind.
    pub fn is_directed(self) -> bool {
        matches!(self, Self::Asymmetric | Self::Unidirectional)
    }
}

/// `Reverse` + `name`.
pub fn reversed(name: &str) -> String {
    format!("{REVERSE_PREFIX}{name}")
}

/// Whether `field` renders a headword.
pub fn is_headword_field(field: &str) -> bool {
    HEADWORD_FIELDS.contains(&field)
}

/// Objects held by `field` on `obj`; empty when unset or not object-valued.
pub fn objects(accessor: &dyn FieldAccessor, obj: ObjectId, field: &str) -> Vec<ObjectId> {
    accessor
        .get_field(obj, field)
        .map(|v| v.objects().to_vec())
        .unwrap_or_default()
}

/// Shape of a variant or complex-form reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryRefInfo {
    /// Complex-form ref rather than variant ref.
    pub is_complex: bool,
    /// Complex form types or variant types, per `is_complex`.
    pub types: Vec<ObjectId>,
    /// Components.
    pub components: Vec<ObjectId>,
    /// Primary components.
    pub primaries: Vec<ObjectId>,
}

impl EntryRefInfo {
    /// Reads the ref's shape from the store.
    pub fn read(accessor: &dyn FieldAccessor, entry_ref: ObjectId) -> Self {
        let is_complex = matches!(accessor.get_field(entry_ref, REF_TYPE), Some(Value::Integer(1)));
        let types_field = if is_complex {
            COMPLEX_ENTRY_TYPES
        } else {
            VARIANT_ENTRY_TYPES
        };
        Self {
            is_complex,
            types: objects(accessor, entry_ref, types_field),
            components: objects(accessor, entry_ref, COMPONENT_LEXEMES),
            primaries: objects(accessor, entry_ref, PRIMARY_LEXEMES),
        }
    }

    /// Whether `owner` is a component or primary component of this ref.
    pub fn mentions(&self, owner: ObjectId) -> bool {
        self.components.contains(&owner) || self.primaries.contains(&owner)
    }
}

/// Shape of a lexical relation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LexReferenceInfo {
    /// Relation type.
    pub relation_type: Option<ObjectId>,
    /// Mapping of the relation type.
    pub mapping: MappingKind,
    /// Related objects, in stored order.
    pub targets: Vec<ObjectId>,
}

impl LexReferenceInfo {
    /// Reads the relation's shape from the store.
    pub fn read(accessor: &dyn FieldAccessor, reference: ObjectId) -> Self {
        let relation_type = match accessor.get_field(reference, OWNER_TYPE) {
            Some(Value::Object(t)) => Some(t),
            _ => None,
        };
        let mapping = relation_type
            .and_then(|t| match accessor.get_field(t, MAPPING_TYPE) {
                Some(Value::Integer(code)) => Some(MappingKind::from_code(code)),
                _ => None,
            })
            .unwrap_or_default();
        Self {
            relation_type,
            mapping,
            targets: objects(accessor, reference, TARGETS),
        }
    }
}
