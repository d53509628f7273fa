// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Field resolution: from a configuration node and a subject object to the
//! value the node displays, classified for rendering.
//!
//! A resolver belongs to one render worker. It memoizes schema lookups in a
//! run-scoped [`FxHashMap`] so that a class/field pair is asked of the
//! store once per worker, not once per entry.
use lexi_config::{ConfigNodeId, ConfigTree, ListOptions, NodeOptions};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::ident::ObjectId;
use crate::ports::{FieldKind, ObjectKind, RenderEnvironment};
use crate::schema::{self, LexReferenceInfo, MappingKind};
use crate::value::Value;

/// Traversal direction through a directed lexical relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// From the first target outward.
    #[default]
    Forward,
    /// Back towards the first target.
    Reverse,
}

impl Direction {
    /// Option-id suffix marking this direction.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Forward => ":f",
            Self::Reverse => ":r",
        }
    }
}

/// How the generator should render a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
    /// Paragraph-structured text.
    Paragraphs,
    /// Sequence or collection of objects.
    Collection,
    /// File owned by a picture.
    PictureFile,
    /// Any other file.
    File,
    /// Form object.
    Form,
    /// Possibility-list item.
    Possibility,
    /// Any other object.
    Object,
    /// String, number, date, or text.
    Primitive,
}

/// A lexical relation, tagged with the direction it is seen from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRef {
    /// The relation object.
    pub reference: ObjectId,
    /// Direction relative to the traversal parent.
    pub direction: Direction,
    /// List-option id the relation is configured under.
    pub option_id: String,
}

/// Result of resolving a node against a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The value.
    pub value: Value,
    /// Rendering classification.
    pub kind: ResolvedKind,
    /// Object whose field produced `value`.
    pub owner: ObjectId,
    /// For lexical-relation lists: the relations in configured order.
    /// `value` then holds the same relations as a sequence.
    pub relations: Vec<RelationRef>,
}

/// Resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The class has no such field. Recoverable: renders nothing.
    #[error("no field `{field}` on class `{class}`")]
    FieldNotFound {
        /// Class of the object the lookup ran against.
        class: String,
        /// Missing field name.
        field: String,
    },
    /// A root node names no field. Fatal.
    #[error("{path}: root node has no field description")]
    InvalidConfiguration {
        /// Ancestry path of the node.
        path: String,
    },
}

/// Per-worker field resolver.
pub struct FieldResolver<'a> {
    env: RenderEnvironment<'a>,
    tree: &'a ConfigTree,
    kinds: FxHashMap<String, FxHashMap<String, Option<FieldKind>>>,
}

impl<'a> FieldResolver<'a> {
    /// Resolver with an empty schema cache.
    pub fn new(env: RenderEnvironment<'a>, tree: &'a ConfigTree) -> Self {
        Self {
            env,
            tree,
            kinds: FxHashMap::default(),
        }
    }

    /// Number of class/field pairs memoized so far.
    pub fn cached_lookups(&self) -> usize {
        self.kinds.values().map(FxHashMap::len).sum()
    }

    /// Resolves node `id` against `subject`.
    ///
    /// `Ok(None)` means the node does not apply to the subject (an undefined
    /// custom field, or data that does not have the configured shape).
    /// Grouping nodes pass the subject through unchanged.
    pub fn resolve(
        &mut self,
        id: ConfigNodeId,
        subject: ObjectId,
        direction: Direction,
    ) -> Result<Option<Resolved>, ResolveError> {
        let tree = self.tree;
        let node = &tree[id];
        if node.is_grouping() {
            return Ok(Some(Resolved {
                value: Value::Object(subject),
                kind: ResolvedKind::Object,
                owner: subject,
                relations: Vec::new(),
            }));
        }
        let path = node.field_path.trim();
        if path.is_empty() {
            if node.parent().is_none() {
                return Err(ResolveError::InvalidConfiguration {
                    path: tree.node_path(id),
                });
            }
            return Err(ResolveError::FieldNotFound {
                class: self.class_of(subject),
                field: String::new(),
            });
        }

        let reverse = direction == Direction::Reverse;
        let under_relation_type = node
            .parent()
            .is_some_and(|p| tree[p].field_path == schema::OWNER_TYPE);
        let (mut value, mut owner) = if node.is_custom_field {
            match self.custom_field(subject, path) {
                Some(value) => (value, subject),
                None => return Ok(None),
            }
        } else {
            let reverse_last = reverse && node.sub_field.is_none() && under_relation_type;
            match self.walk(subject, path, reverse_last)? {
                Some(found) => found,
                None => return Ok(None),
            }
        };

        if let Some(sub) = node.sub_field.as_deref() {
            match value {
                Value::Object(obj) => {
                    value = self.field_in_direction(obj, sub, reverse)?;
                    owner = obj;
                }
                Value::Null => {}
                _ => {
                    debug!(field = sub, "sub-field applied to a non-object value");
                    return Ok(None);
                }
            }
        }

        let relation_list = node
            .options
            .as_ref()
            .and_then(NodeOptions::list_options)
            .filter(|l| l.is_lexical_relation_list());
        let ordered = match (relation_list, &value) {
            (Some(list), Value::Sequence(items) | Value::Collection(items)) => {
                Some(self.order_relations(items, subject, list))
            }
            _ => None,
        };
        let relations = match ordered {
            Some(relations) => {
                value = Value::Sequence(relations.iter().map(|r| r.reference).collect());
                relations
            }
            None => Vec::new(),
        };

        let kind = self.classify(&value, owner, id);
        Ok(Some(Resolved {
            value,
            kind,
            owner,
            relations,
        }))
    }

    fn class_of(&self, obj: ObjectId) -> String {
        self.env
            .accessor
            .class_name(obj)
            .unwrap_or_default()
            .to_owned()
    }

    fn custom_field(&self, subject: ObjectId, path: &str) -> Option<Value> {
        let (owner_class, field) = match path.split_once('.') {
            Some((owner, field)) => (owner.to_owned(), field),
            None => (self.class_of(subject), path),
        };
        let value = self
            .env
            .accessor
            .get_custom_field(subject, &owner_class, field);
        if value.is_none() {
            debug!(class = %owner_class, field, "custom field not defined for class");
        }
        value
    }

    fn walk(
        &mut self,
        subject: ObjectId,
        path: &str,
        reverse_last: bool,
    ) -> Result<Option<(Value, ObjectId)>, ResolveError> {
        let mut value = Value::Object(subject);
        let mut owner = subject;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let obj = match value {
                Value::Object(obj) => obj,
                Value::Null => return Ok(Some((Value::Null, owner))),
                _ => {
                    debug!(path, segment, "path continues past a non-object value");
                    return Ok(None);
                }
            };
            let last = segments.peek().is_none();
            value = self.field_in_direction(obj, segment, reverse_last && last)?;
            owner = obj;
        }
        Ok(Some((value, owner)))
    }

    /// `Reverse<name>` when reversing and the class has it, else `name`.
    fn field_in_direction(
        &mut self,
        obj: ObjectId,
        name: &str,
        reverse: bool,
    ) -> Result<Value, ResolveError> {
        if reverse {
            let reversed = schema::reversed(name);
            if self.kind_of(obj, &reversed).is_some() {
                return self.field(obj, &reversed);
            }
        }
        self.field(obj, name)
    }

    fn field(&mut self, obj: ObjectId, name: &str) -> Result<Value, ResolveError> {
        if self.kind_of(obj, name).is_none() {
            return Err(ResolveError::FieldNotFound {
                class: self.class_of(obj),
                field: name.to_owned(),
            });
        }
        Ok(self.env.accessor.get_field(obj, name).unwrap_or_default())
    }

    fn kind_of(&mut self, obj: ObjectId, name: &str) -> Option<FieldKind> {
        let accessor = self.env.accessor;
        let class = accessor.class_name(obj).unwrap_or_default();
        if let Some(kind) = self.kinds.get(class).and_then(|fields| fields.get(name)) {
            return *kind;
        }
        let kind = accessor.field_kind(class, name);
        self.kinds
            .entry(class.to_owned())
            .or_default()
            .insert(name.to_owned(), kind);
        kind
    }

    fn order_relations(
        &self,
        items: &[ObjectId],
        parent: ObjectId,
        list: &ListOptions,
    ) -> Vec<RelationRef> {
        let accessor = self.env.accessor;
        let tagged: Vec<RelationRef> = items
            .iter()
            .map(|&reference| {
                let info = LexReferenceInfo::read(accessor, reference);
                let direction = if info.targets.first() == Some(&parent) {
                    Direction::Forward
                } else {
                    Direction::Reverse
                };
                let type_id = info
                    .relation_type
                    .map(|t| accessor.guid(t).to_string())
                    .unwrap_or_default();
                let option_id = if info.mapping == MappingKind::Asymmetric {
                    format!("{type_id}{}", direction.marker())
                } else {
                    type_id
                };
                RelationRef {
                    reference,
                    direction,
                    option_id,
                }
            })
            .collect();
        list.enabled_ids()
            .flat_map(|id| tagged.iter().filter(move |r| r.option_id == id).cloned())
            .collect()
    }

    fn classify(&self, value: &Value, owner: ObjectId, id: ConfigNodeId) -> ResolvedKind {
        let accessor = self.env.accessor;
        match value {
            Value::Paragraphs(_) => ResolvedKind::Paragraphs,
            Value::Sequence(_) | Value::Collection(_) => ResolvedKind::Collection,
            Value::File(_) if self.picture_owned(owner, id) => ResolvedKind::PictureFile,
            Value::File(_) => ResolvedKind::File,
            Value::Object(obj) => match accessor.object_kind(*obj) {
                ObjectKind::Form => ResolvedKind::Form,
                ObjectKind::Possibility | ObjectKind::RelationType => ResolvedKind::Possibility,
                _ => ResolvedKind::Object,
            },
            _ => ResolvedKind::Primitive,
        }
    }

    fn picture_owned(&self, owner: ObjectId, id: ConfigNodeId) -> bool {
        self.env.accessor.object_kind(owner) == ObjectKind::Picture
            || self.tree[id]
                .parent()
                .and_then(|p| self.tree[p].options.as_ref())
                .is_some_and(NodeOptions::is_picture)
    }
}

impl std::fmt::Debug for FieldResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldResolver")
            .field("cached_lookups", &self.cached_lookups())
            .finish_non_exhaustive()
    }
}
