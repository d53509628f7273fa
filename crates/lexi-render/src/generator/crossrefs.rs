// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lexical relations ("cross-references") grouped by relation type and
//! direction.
use lexi_config::{ConfigNodeId, NodeOptions};

use super::{Generator, RenderState};
use crate::error::RenderError;
use crate::ident::ObjectId;
use crate::markup::Tag;
use crate::resolver::{Direction, RelationRef};
use crate::schema::{self, LexReferenceInfo, MappingKind};

/// Consecutive relations of one type seen from one direction.
struct Bucket {
    relation_type: Option<ObjectId>,
    direction: Direction,
    mapping: MappingKind,
    option_id: String,
    first_reference: ObjectId,
    targets: Vec<ObjectId>,
}

impl Generator<'_> {
    /// Renders `relations` (already in configured order) for `owner`.
    pub(super) fn generate_cross_references(
        &mut self,
        owner: ObjectId,
        id: ConfigNodeId,
        relations: &[RelationRef],
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let accessor = self.env.accessor;
        let filter = self.env.filter;
        let Some(list) = tree[id].options.as_ref().and_then(NodeOptions::list_options) else {
            return Ok(String::new());
        };
        let type_node = tree.child_with_field(id, schema::OWNER_TYPE);
        let targets_node = tree
            .child_with_field(id, schema::CONFIG_TARGETS)
            .filter(|n| tree[*n].enabled);

        let mut buckets: Vec<Bucket> = Vec::new();
        for relation in relations {
            let info = LexReferenceInfo::read(accessor, relation.reference);
            let direction = if info.mapping.is_directed() {
                relation.direction
            } else {
                Direction::Forward
            };
            let targets = info.targets.into_iter().filter(|t| !filter.is_excluded(*t));
            match buckets.last_mut() {
                Some(bucket)
                    if bucket.relation_type == info.relation_type
                        && bucket.direction == direction =>
                {
                    bucket.targets.extend(targets);
                }
                _ => buckets.push(Bucket {
                    relation_type: info.relation_type,
                    direction,
                    mapping: info.mapping,
                    option_id: relation.option_id.clone(),
                    first_reference: relation.reference,
                    targets: targets.collect(),
                }),
            }
        }

        let block = tree[id]
            .options
            .as_ref()
            .is_some_and(NodeOptions::display_each_in_paragraph);
        let mut parts = Vec::new();
        for mut bucket in buckets {
            if !list.is_enabled(&bucket.option_id) {
                continue;
            }
            match (bucket.mapping, bucket.direction) {
                (MappingKind::Unidirectional, Direction::Reverse) => continue,
                (MappingKind::Asymmetric, Direction::Reverse) => {
                    // Seen from a later target, only the first one is related.
                    bucket.targets.retain(|t| *t != owner);
                    bucket.targets.truncate(1);
                }
                (MappingKind::Sequence, _) => {}
                _ => bucket.targets.retain(|t| *t != owner),
            }
            if !matches!(bucket.mapping, MappingKind::Unidirectional | MappingKind::Sequence) {
                bucket
                    .targets
                    .sort_by_cached_key(|t| accessor.headword(*t).text().to_lowercase());
            }
            let Some(targets_node) = targets_node else {
                continue;
            };
            let targets = self.generate_targets(&bucket.targets, targets_node, state)?;
            if targets.is_empty() {
                continue;
            }
            let label = match type_node {
                Some(n) => self.generate(
                    bucket.first_reference,
                    n,
                    &state.with_direction(bucket.direction),
                )?,
                None => String::new(),
            };
            parts.push(
                Tag::block_if(block)
                    .class(self.item_class(id))
                    .wrap(&(label + &targets)),
            );
        }
        Ok(parts.join(&self.literal(tree[id].between.as_deref())))
    }

    fn generate_targets(
        &mut self,
        targets: &[ObjectId],
        id: ConfigNodeId,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let forward = state.with_direction(Direction::Forward);
        let mut items = Vec::with_capacity(targets.len());
        for &target in targets {
            let content = self.generate_children(target, id, &forward, &[])?;
            if !content.is_empty() {
                items.push(Tag::span().class(self.item_class(id)).wrap(&content));
            }
        }
        let joined = items.join(&self.literal(self.tree[id].between.as_deref()));
        Ok(Tag::span().class(self.node_class(id)).wrap(&joined))
    }
}
