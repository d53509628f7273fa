// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Arena-backed dictionary configuration tree.
//!
//! Nodes live in a single `Vec` owned by [`ConfigTree`] and are addressed by
//! [`ConfigNodeId`]. A node owns its direct children (the ids in
//! `children`); `parent` and `referenced_node` are plain ids and never own
//! anything, so shared subtrees referenced from many parents cannot form
//! ownership cycles.
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::NodeOptions;

/// Stable index of a node inside its [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigNodeId(pub u32);

impl ConfigNodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a node's style is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    /// Character (inline) style.
    Character,
    /// Paragraph (block) style.
    Paragraph,
    /// Whatever the node's shape implies.
    #[default]
    Default,
}

/// Errors raised while building, linking, or validating a configuration tree.
///
/// All of these are fatal to a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A `reference_item` names no shared item.
    #[error("{path}: reference to unknown shared item `{item}`")]
    UnresolvedReference {
        /// Ancestry path of the referencing node.
        path: String,
        /// The missing shared-item label.
        item: String,
    },
    /// A node that must name a field has none.
    #[error("{path}: missing field description")]
    MissingFieldPath {
        /// Ancestry path of the offending node.
        path: String,
    },
    /// Node options do not fit the node.
    #[error("{path}: malformed node options: {reason}")]
    MalformedOptions {
        /// Ancestry path of the offending node.
        path: String,
        /// What is wrong.
        reason: String,
    },
    /// Two flattened siblings share a `(label, label_suffix)` pair.
    #[error("{path}: duplicate label among siblings")]
    DuplicateLabel {
        /// Ancestry path of the second occurrence.
        path: String,
    },
    /// A root node cannot be duplicated or re-suffixed in place.
    #[error("{path}: node has no sibling list")]
    Detached {
        /// Ancestry path of the node.
        path: String,
    },
}

/// One element of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    /// Editor-facing label.
    pub label: String,
    /// Disambiguates duplicated nodes with the same label.
    pub label_suffix: Option<String>,
    /// Disabled nodes render nothing.
    pub enabled: bool,
    /// `field_path` names a user-defined custom field.
    pub is_custom_field: bool,
    /// Custom-field children of this node are not rendered.
    pub hide_custom_fields: bool,
    /// Named style.
    pub style: Option<String>,
    /// How `style` is applied.
    pub style_kind: StyleKind,
    /// Literal text before the node's content.
    pub before: Option<String>,
    /// Literal text between list items.
    pub between: Option<String>,
    /// Literal text after the node's content.
    pub after: Option<String>,
    /// Dotted property path into the data model.
    pub field_path: String,
    /// Optional second hop applied after `field_path`.
    pub sub_field: Option<String>,
    /// Replaces the label-derived CSS class.
    pub css_class_override: Option<String>,
    /// Display shape.
    pub options: Option<NodeOptions>,
    /// Owned children, in order.
    pub children: Option<Vec<ConfigNodeId>>,
    /// Label of the shared item whose children this node borrows.
    pub reference_item: Option<String>,
    #[serde(skip)]
    pub(crate) parent: Option<ConfigNodeId>,
    #[serde(skip)]
    pub(crate) referenced_node: Option<ConfigNodeId>,
}

impl ConfigNode {
    /// Enabled node with the given label and field path.
    pub fn new(label: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            label_suffix: None,
            enabled: true,
            is_custom_field: false,
            hide_custom_fields: false,
            style: None,
            style_kind: StyleKind::Default,
            before: None,
            between: None,
            after: None,
            field_path: field_path.into(),
            sub_field: None,
            css_class_override: None,
            options: None,
            children: None,
            reference_item: None,
            parent: None,
            referenced_node: None,
        }
    }

    /// Sets the display options.
    pub fn with_options(mut self, options: NodeOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Sets the second-hop field.
    pub fn with_sub_field(mut self, sub_field: impl Into<String>) -> Self {
        self.sub_field = Some(sub_field.into());
        self
    }

    /// Sets the label suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.label_suffix = Some(suffix.into());
        self
    }

    /// Sets the style name.
    pub fn with_style(mut self, style: impl Into<String>, kind: StyleKind) -> Self {
        self.style = Some(style.into());
        self.style_kind = kind;
        self
    }

    /// Sets the CSS class override.
    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class_override = Some(class.into());
        self
    }

    /// Sets the before/between/after literals.
    pub fn with_separators(mut self, before: &str, between: &str, after: &str) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        self.before = non_empty(before);
        self.between = non_empty(between);
        self.after = non_empty(after);
        self
    }

    /// Borrows children from the shared item labelled `item`.
    pub fn with_reference(mut self, item: impl Into<String>) -> Self {
        self.reference_item = Some(item.into());
        self
    }

    /// Marks the node as a custom field.
    pub fn custom(mut self) -> Self {
        self.is_custom_field = true;
        self
    }

    /// Marks the node disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Parent link, assigned when the tree is linked or a node is attached.
    pub fn parent(&self) -> Option<ConfigNodeId> {
        self.parent
    }

    /// Resolved shared item, assigned by
    /// [`ConfigTree::specify_parents_and_references`].
    pub fn referenced_node(&self) -> Option<ConfigNodeId> {
        self.referenced_node
    }

    /// `true` when the options are [`NodeOptions::Grouping`].
    pub fn is_grouping(&self) -> bool {
        self.options.as_ref().is_some_and(NodeOptions::is_grouping)
    }

    fn same_label(&self, other: &Self) -> bool {
        self.label == other.label && self.label_suffix == other.label_suffix
    }
}

/// A complete dictionary configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    /// Name of the configuration (e.g. "Root-based (complex forms as subentries)").
    pub label: String,
    nodes: Vec<ConfigNode>,
    parts: Vec<ConfigNodeId>,
    shared_items: Vec<ConfigNodeId>,
}

impl Index<ConfigNodeId> for ConfigTree {
    type Output = ConfigNode;

    fn index(&self, id: ConfigNodeId) -> &ConfigNode {
        &self.nodes[id.index()]
    }
}

impl IndexMut<ConfigNodeId> for ConfigTree {
    fn index_mut(&mut self, id: ConfigNodeId) -> &mut ConfigNode {
        &mut self.nodes[id.index()]
    }
}

impl ConfigTree {
    /// Empty tree.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    fn push(&mut self, node: ConfigNode) -> ConfigNodeId {
        let id = ConfigNodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    /// Adds a top-level entry configuration ("Main Entry", "Minor Entry", …).
    pub fn add_part(&mut self, node: ConfigNode) -> ConfigNodeId {
        let id = self.push(node);
        self.parts.push(id);
        id
    }

    /// Adds a shared subtree referenced by label from other nodes.
    pub fn add_shared_item(&mut self, node: ConfigNode) -> ConfigNodeId {
        let id = self.push(node);
        self.shared_items.push(id);
        id
    }

    /// Appends `node` to `parent`'s children.
    pub fn add_child(&mut self, parent: ConfigNodeId, mut node: ConfigNode) -> ConfigNodeId {
        node.parent = Some(parent);
        let id = self.push(node);
        self[parent].children.get_or_insert_with(Vec::new).push(id);
        id
    }

    /// Node for `id`, if it belongs to this tree.
    pub fn get(&self, id: ConfigNodeId) -> Option<&ConfigNode> {
        self.nodes.get(id.index())
    }

    /// Top-level entry configurations in order.
    pub fn parts(&self) -> &[ConfigNodeId] {
        &self.parts
    }

    /// Shared subtrees in order.
    pub fn shared_items(&self) -> &[ConfigNodeId] {
        &self.shared_items
    }

    /// Number of nodes in the arena (including detached clones).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Own children of `id` (empty when none).
    pub fn children(&self, id: ConfigNodeId) -> &[ConfigNodeId] {
        self[id].children.as_deref().unwrap_or(&[])
    }

    /// Own children if present, else the referenced shared item's children.
    pub fn effective_children(&self, id: ConfigNodeId) -> &[ConfigNodeId] {
        let node = &self[id];
        match (&node.children, node.referenced_node) {
            (Some(children), _) if !children.is_empty() => children.as_slice(),
            (_, Some(shared)) => self.children(shared),
            (Some(children), None) => children.as_slice(),
            (None, None) => &[],
        }
    }

    /// First effective child with the given field path.
    pub fn child_with_field(&self, id: ConfigNodeId, field_path: &str) -> Option<ConfigNodeId> {
        self.effective_children(id)
            .iter()
            .copied()
            .find(|c| self[*c].field_path == field_path)
    }

    /// First effective child with the given label.
    pub fn child_with_label(&self, id: ConfigNodeId, label: &str) -> Option<ConfigNodeId> {
        self.effective_children(id)
            .iter()
            .copied()
            .find(|c| self[*c].label == label)
    }

    /// Links every `parent` and resolves every `reference_item`.
    ///
    /// Shared items are parented under the first node (parts first, depth
    /// first) that references them; that node becomes the master parent.
    pub fn specify_parents_and_references(&mut self) -> Result<(), TreeError> {
        for shared in self.shared_items.clone() {
            self[shared].parent = None;
        }
        let roots: Vec<_> = self.parts.iter().chain(&self.shared_items).copied().collect();
        for root in &roots {
            if !self.shared_items.contains(root) {
                self[*root].parent = None;
            }
        }
        for root in roots {
            self.link_subtree(root)?;
        }
        Ok(())
    }

    fn link_subtree(&mut self, id: ConfigNodeId) -> Result<(), TreeError> {
        if let Some(item) = self[id].reference_item.clone() {
            let shared = self
                .shared_items
                .iter()
                .copied()
                .find(|s| self[*s].label == item)
                .ok_or_else(|| TreeError::UnresolvedReference {
                    path: self.node_path(id),
                    item: item.clone(),
                })?;
            self[id].referenced_node = Some(shared);
            if self[shared].parent.is_none() && shared != id {
                self[shared].parent = Some(id);
            }
        } else {
            self[id].referenced_node = None;
        }
        for child in self.children(id).to_vec() {
            self[child].parent = Some(id);
            self.link_subtree(child)?;
        }
        Ok(())
    }

    /// This node owns the shared subtree it references.
    pub fn is_master_parent(&self, id: ConfigNodeId) -> bool {
        self[id]
            .referenced_node
            .is_some_and(|shared| self[shared].parent == Some(id))
    }

    /// This node merely borrows a shared subtree owned elsewhere.
    pub fn is_subordinate_parent(&self, id: ConfigNodeId) -> bool {
        self[id].referenced_node.is_some() && !self.is_master_parent(id)
    }

    /// This node is a shared item hanging off its master parent.
    pub fn is_shared_item(&self, id: ConfigNodeId) -> bool {
        self[id]
            .parent
            .is_some_and(|p| self[p].referenced_node == Some(id))
    }

    /// `true` if `id` or any ancestor is a shared item.
    pub fn is_shared_item_or_descendant(&self, id: ConfigNodeId) -> bool {
        self.ancestry(id).any(|n| self.shared_items.contains(&n))
    }

    /// `id` followed by each ancestor up to its root.
    pub fn ancestry(&self, id: ConfigNodeId) -> impl Iterator<Item = ConfigNodeId> + '_ {
        let mut steps = 0usize;
        let limit = self.nodes.len();
        std::iter::successors(Some(id), move |n| {
            steps += 1;
            // A shared item parented under its own descendant would loop.
            if steps > limit {
                None
            } else {
                self[*n].parent
            }
        })
    }

    /// Editor label with suffix; grouping nodes are bracketed.
    pub fn display_label(&self, id: ConfigNodeId) -> String {
        self.display_label_with(id, str::to_owned)
    }

    /// [`Self::display_label`] with a localization hook applied to the label.
    pub fn display_label_with(&self, id: ConfigNodeId, localize: impl Fn(&str) -> String) -> String {
        let node = &self[id];
        let mut label = localize(&node.label);
        if let Some(suffix) = &node.label_suffix {
            label = format!("{label} ({suffix})");
        }
        if node.is_grouping() {
            label = format!("[{label}]");
        }
        label
    }

    /// Ancestry path for diagnostics, e.g. `Main Entry > Senses > Gloss`.
    pub fn node_path(&self, id: ConfigNodeId) -> String {
        let mut labels: Vec<_> = self.ancestry(id).map(|n| self.display_label(n)).collect();
        labels.reverse();
        labels.join(" > ")
    }

    /// CSS class for the node's container element.
    pub fn css_class(&self, id: ConfigNodeId) -> String {
        let node = &self[id];
        if let Some(class) = &node.css_class_override {
            return class.clone();
        }
        let mut class = css_ident(&node.label);
        if let Some(suffix) = &node.label_suffix {
            class.push('_');
            class.push_str(&css_ident(suffix));
        }
        if node.is_grouping() {
            class.insert_str(0, "grouping_");
        }
        class
    }

    fn sibling_list(&self, id: ConfigNodeId) -> Option<&[ConfigNodeId]> {
        match self[id].parent {
            Some(parent) => Some(self.children(parent)),
            None if self.parts.contains(&id) => Some(&self.parts),
            None if self.shared_items.contains(&id) => Some(&self.shared_items),
            None => None,
        }
    }

    /// Siblings of `id` for label uniqueness: climbs out of grouping parents
    /// and descends into grouping siblings. Excludes `id` itself.
    pub fn flattened_siblings(&self, id: ConfigNodeId) -> Vec<ConfigNodeId> {
        let mut top = id;
        while let Some(parent) = self[top].parent {
            if !self[parent].is_grouping() {
                break;
            }
            top = parent;
        }
        let mut out = Vec::new();
        if let Some(list) = self.sibling_list(top) {
            self.flatten_into(list, &mut out);
        }
        out.retain(|n| *n != id);
        out
    }

    fn flatten_into(&self, list: &[ConfigNodeId], out: &mut Vec<ConfigNodeId>) {
        for &n in list {
            out.push(n);
            if self[n].is_grouping() {
                self.flatten_into(self.children(n), out);
            }
        }
    }

    /// Deep-clones `id` under `new_parent` without attaching it to any
    /// sibling list.
    ///
    /// A grouping node's children are only cloned when `is_recursive` is
    /// set, so duplicating a group in place never entangles it with its copy.
    pub fn deep_clone(
        &mut self,
        id: ConfigNodeId,
        new_parent: Option<ConfigNodeId>,
        is_recursive: bool,
    ) -> ConfigNodeId {
        let mut copy = self[id].clone();
        copy.parent = new_parent;
        let children = copy.children.take();
        let skip_children = copy.is_grouping() && !is_recursive;
        let clone_id = self.push(copy);
        if !skip_children {
            if let Some(children) = children {
                let cloned = children
                    .into_iter()
                    .map(|c| self.deep_clone(c, Some(clone_id), true))
                    .collect();
                self[clone_id].children = Some(cloned);
            }
        }
        clone_id
    }

    /// Clones `id` next to itself with the lowest free numeric suffix.
    pub fn duplicate_among_siblings(&mut self, id: ConfigNodeId) -> Result<ConfigNodeId, TreeError> {
        if self.sibling_list(id).is_none() {
            return Err(TreeError::Detached {
                path: self.node_path(id),
            });
        }
        let mut taken = self.flattened_siblings(id);
        taken.push(id);
        let label = self[id].label.clone();
        let suffix = (1usize..)
            .map(|n| n.to_string())
            .find(|s| {
                !taken.iter().any(|t| {
                    self[*t].label == label && self[*t].label_suffix.as_deref() == Some(s.as_str())
                })
            })
            .unwrap_or_default();
        let parent = self[id].parent;
        let clone = self.deep_clone(id, parent, false);
        self[clone].label_suffix = Some(suffix);
        let list = match parent {
            Some(p) => self[p].children.get_or_insert_with(Vec::new),
            None if self.parts.contains(&id) => &mut self.parts,
            None => &mut self.shared_items,
        };
        let at = list.iter().position(|n| *n == id).map_or(list.len(), |p| p + 1);
        list.insert(at, clone);
        Ok(clone)
    }

    /// Renames the suffix unless a flattened sibling already uses the
    /// resulting `(label, suffix)`. Returns whether the rename happened.
    pub fn try_set_label_suffix(&mut self, id: ConfigNodeId, suffix: Option<String>) -> bool {
        let label = &self[id].label;
        let clash = self.flattened_siblings(id).into_iter().any(|s| {
            let sib = &self[s];
            &sib.label == label && sib.label_suffix == suffix
        });
        if clash {
            return false;
        }
        self[id].label_suffix = suffix;
        true
    }

    /// Checks every rule a generation run depends on.
    pub fn validate(&self) -> Result<(), TreeError> {
        for &part in &self.parts {
            if self[part].field_path.trim().is_empty() {
                return Err(TreeError::MissingFieldPath {
                    path: self.node_path(part),
                });
            }
        }
        for root in self.parts.iter().chain(&self.shared_items) {
            self.validate_subtree(*root)?;
        }
        Ok(())
    }

    fn validate_subtree(&self, id: ConfigNodeId) -> Result<(), TreeError> {
        let node = &self[id];
        if !node.is_grouping() && node.field_path.trim().is_empty() {
            return Err(TreeError::MissingFieldPath {
                path: self.node_path(id),
            });
        }
        if let Some(ws) = node.options.as_ref().and_then(NodeOptions::writing_system_options) {
            if ws.options.is_empty() {
                return Err(TreeError::MalformedOptions {
                    path: self.node_path(id),
                    reason: "no writing systems listed".into(),
                });
            }
        }
        if self
            .flattened_siblings(id)
            .iter()
            .any(|s| s.0 < id.0 && self[*s].same_label(node))
        {
            return Err(TreeError::DuplicateLabel {
                path: self.node_path(id),
            });
        }
        for &child in self.children(id) {
            self.validate_subtree(child)?;
        }
        Ok(())
    }
}

fn css_ident(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
