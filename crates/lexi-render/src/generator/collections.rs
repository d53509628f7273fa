// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collection rendering: filtering, ordering, and factoring by type.
use lexi_config::{ConfigNodeId, ListId, ListOptions, NodeOptions};

use super::{Generator, RenderState};
use crate::error::RenderError;
use crate::ident::ObjectId;
use crate::markup::Tag;
use crate::ports::ObjectKind;
use crate::resolver::{RelationRef, Resolved};
use crate::schema::{self, EntryRefInfo};
use crate::value::Value;

/// A collection item with the ids of the types it is filed under.
struct Typed {
    item: ObjectId,
    types: Vec<(ObjectId, String)>,
}

impl Generator<'_> {
    pub(super) fn generate_collection(
        &mut self,
        subject: ObjectId,
        id: ConfigNodeId,
        resolved: Resolved,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let node = &tree[id];
        let accessor = self.env.accessor;
        let filter = self.env.filter;

        let (items, ordered) = match resolved.value {
            Value::Sequence(items) => (items, true),
            Value::Collection(items) => (items, false),
            _ => return Ok(String::new()),
        };
        let mut items: Vec<ObjectId> = items
            .into_iter()
            .filter(|o| !filter.is_excluded(*o))
            .collect();
        if !ordered {
            items.sort_by_cached_key(|o| (accessor.sort_key(*o), accessor.guid(*o)));
        }
        if items.is_empty() {
            return Ok(String::new());
        }

        let options = node.options.as_ref();
        let list = options.and_then(NodeOptions::list_options);
        // Field-path shapes go before list ids: a Subentries node carrying
        // Complex list options still needs the consume-once grouping.
        let body = if let Some(senses) = options.and_then(NodeOptions::sense_options) {
            self.generate_senses(subject, id, &items, senses, state)?
        } else if node.field_path == schema::MAIN_ENTRY_REFS {
            self.generate_main_entry_refs(id, &items, state)?
        } else if node.field_path.starts_with(schema::SUBENTRIES_PREFIX) {
            self.generate_subentries(subject, id, &items, state)?
        } else if let Some(list) =
            list.filter(|l| matches!(l.list_id, ListId::Variant | ListId::Complex))
        {
            self.generate_typed_refs(subject, id, &items, list, state)?
        } else if list.is_some_and(ListOptions::is_lexical_relation_list) {
            let relations: Vec<RelationRef> = resolved
                .relations
                .into_iter()
                .filter(|r| !filter.is_excluded(r.reference))
                .collect();
            self.generate_cross_references(subject, id, &relations, state)?
        } else {
            self.generate_items(id, &items, state, &[])?
        };
        Ok(Tag::span().class(self.node_class(id)).wrap(&body))
    }

    /// Each item rendered against the node's children, joined by the
    /// node's `between` literal.
    pub(super) fn generate_items(
        &mut self,
        id: ConfigNodeId,
        items: &[ObjectId],
        state: &RenderState,
        skip: &[ConfigNodeId],
    ) -> Result<String, RenderError> {
        let mut parts = Vec::with_capacity(items.len());
        for &item in items {
            let html = self.generate_item(item, id, state, skip)?;
            if !html.is_empty() {
                parts.push(html);
            }
        }
        Ok(parts.join(&self.literal(self.tree[id].between.as_deref())))
    }

    fn generate_item(
        &mut self,
        item: ObjectId,
        id: ConfigNodeId,
        state: &RenderState,
        skip: &[ConfigNodeId],
    ) -> Result<String, RenderError> {
        let content = self.generate_children(item, id, state, skip)?;
        let block = self.tree[id]
            .options
            .as_ref()
            .is_some_and(NodeOptions::display_each_in_paragraph);
        Ok(Tag::block_if(block)
            .class(self.item_class(id))
            .wrap(&content))
    }

    /// Variant or complex-form refs grouped under their configured types.
    fn generate_typed_refs(
        &mut self,
        subject: ObjectId,
        id: ConfigNodeId,
        items: &[ObjectId],
        list: &ListOptions,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let types_field = match list.list_id {
            ListId::Variant => schema::VARIANT_ENTRY_TYPES,
            _ => schema::COMPLEX_ENTRY_TYPES,
        };
        let typed: Vec<Typed> = items
            .iter()
            .map(|&item| self.typed(item, self.item_types(subject, item, types_field)))
            .collect();
        let type_node = self.tree.child_with_field(id, types_field);
        let skip: Vec<ConfigNodeId> = type_node.into_iter().collect();
        let enabled: Vec<&str> = list.enabled_ids().collect();

        let mut parts = self.untyped(id, &typed, state, &skip)?;
        let mut consumed = vec![false; typed.len()];
        parts.extend(self.type_groups(id, &typed, &enabled, type_node, state, &skip, &mut consumed, false)?);
        Ok(parts.join(&self.literal(self.tree[id].between.as_deref())))
    }

    /// The entry refs that make the subject a complex form or variant:
    /// untyped refs, then complex-form types, then variant types, each
    /// pass in configured order. Refs are visited in GUID order.
    fn generate_main_entry_refs(
        &mut self,
        id: ConfigNodeId,
        items: &[ObjectId],
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let accessor = self.env.accessor;
        let mut refs = items.to_vec();
        refs.sort_by_key(|r| accessor.guid(*r));

        let (mut complex, mut variant) = (Vec::new(), Vec::new());
        for &r in &refs {
            let info = EntryRefInfo::read(accessor, r);
            let typed = self.typed(r, info.types);
            if info.is_complex {
                complex.push(typed);
            } else {
                variant.push(typed);
            }
        }
        let complex_node = tree.child_with_field(id, schema::COMPLEX_ENTRY_TYPES);
        let variant_node = tree.child_with_field(id, schema::VARIANT_ENTRY_TYPES);
        let skip: Vec<ConfigNodeId> = complex_node.into_iter().chain(variant_node).collect();
        let enabled: Vec<&str> = tree[id]
            .options
            .as_ref()
            .and_then(NodeOptions::list_options)
            .map(|l| l.enabled_ids().collect())
            .unwrap_or_default();

        let untyped: Vec<ObjectId> = refs
            .iter()
            .copied()
            .filter(|r| {
                complex
                    .iter()
                    .chain(&variant)
                    .any(|t| t.item == *r && t.types.is_empty())
            })
            .collect();
        let mut parts = Vec::new();
        for r in untyped {
            let html = self.generate_item(r, id, state, &skip)?;
            if !html.is_empty() {
                parts.push(html);
            }
        }
        let mut consumed = vec![false; complex.len()];
        parts.extend(self.type_groups(id, &complex, &enabled, complex_node, state, &skip, &mut consumed, false)?);
        let mut consumed = vec![false; variant.len()];
        parts.extend(self.type_groups(id, &variant, &enabled, variant_node, state, &skip, &mut consumed, false)?);
        Ok(parts.join(&self.literal(tree[id].between.as_deref())))
    }

    /// Subentries of `owner`: untyped first, then by complex-form type in
    /// configured order. A subentry appears under its first matching type
    /// only.
    fn generate_subentries(
        &mut self,
        owner: ObjectId,
        id: ConfigNodeId,
        items: &[ObjectId],
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let Some(list) = tree[id].options.as_ref().and_then(NodeOptions::list_options) else {
            return self.generate_items(id, items, state, &[]);
        };
        let typed: Vec<Typed> = items
            .iter()
            .map(|&item| {
                self.typed(item, self.item_types(owner, item, schema::COMPLEX_ENTRY_TYPES))
            })
            .collect();
        let type_node = tree.child_with_field(id, schema::COMPLEX_ENTRY_TYPES);
        let skip: Vec<ConfigNodeId> = type_node.into_iter().collect();
        let enabled: Vec<&str> = list.enabled_ids().collect();

        let mut parts = self.untyped(id, &typed, state, &skip)?;
        let mut consumed = vec![false; typed.len()];
        parts.extend(self.type_groups(id, &typed, &enabled, type_node, state, &skip, &mut consumed, true)?);
        Ok(parts.join(&self.literal(tree[id].between.as_deref())))
    }

    /// Types an item is filed under. Entry refs carry their types directly;
    /// an entry is typed by its refs that mention `owner`.
    fn item_types(&self, owner: ObjectId, item: ObjectId, types_field: &str) -> Vec<ObjectId> {
        let accessor = self.env.accessor;
        if accessor.object_kind(item) == ObjectKind::EntryRef {
            return schema::objects(accessor, item, types_field);
        }
        schema::objects(accessor, item, schema::ENTRY_REFS)
            .into_iter()
            .map(|r| EntryRefInfo::read(accessor, r))
            .filter(|info| info.mentions(owner))
            .flat_map(|info| info.types)
            .collect()
    }

    fn typed(&self, item: ObjectId, types: Vec<ObjectId>) -> Typed {
        let accessor = self.env.accessor;
        Typed {
            item,
            types: types
                .into_iter()
                .map(|t| (t, accessor.guid(t).to_string()))
                .collect(),
        }
    }

    fn untyped(
        &mut self,
        id: ConfigNodeId,
        typed: &[Typed],
        state: &RenderState,
        skip: &[ConfigNodeId],
    ) -> Result<Vec<String>, RenderError> {
        let mut parts = Vec::new();
        for t in typed.iter().filter(|t| t.types.is_empty()) {
            let html = self.generate_item(t.item, id, state, skip)?;
            if !html.is_empty() {
                parts.push(html);
            }
        }
        Ok(parts)
    }

    /// One group per enabled type id that has members: the type header
    /// (when the type node has enabled children) followed by the members.
    #[allow(clippy::too_many_arguments)]
    fn type_groups(
        &mut self,
        id: ConfigNodeId,
        typed: &[Typed],
        enabled: &[&str],
        type_node: Option<ConfigNodeId>,
        state: &RenderState,
        skip: &[ConfigNodeId],
        consumed: &mut [bool],
        consume_once: bool,
    ) -> Result<Vec<String>, RenderError> {
        let tree = self.tree;
        let header_node = type_node.filter(|n| {
            tree[*n].enabled && tree.effective_children(*n).iter().any(|c| tree[*c].enabled)
        });
        let mut groups = Vec::new();
        for option in enabled {
            let mut header_type = None;
            let mut members = String::new();
            for (index, t) in typed.iter().enumerate() {
                if consume_once && consumed[index] {
                    continue;
                }
                let Some((type_obj, _)) = t.types.iter().find(|(_, guid)| guid == option) else {
                    continue;
                };
                header_type.get_or_insert(*type_obj);
                consumed[index] = true;
                members.push_str(&self.generate_item(t.item, id, state, skip)?);
            }
            if members.is_empty() {
                continue;
            }
            let header = match (header_node, header_type) {
                (Some(n), Some(type_obj)) => self.generate_object(type_obj, n, state)?,
                _ => String::new(),
            };
            groups.push(header + &members);
        }
        Ok(groups)
    }
}
