// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fragment generator: renders one configuration node against one subject
//! object, recursing through the node's children.
//!
//! Every method returns the empty string when there is nothing to show, so
//! emptiness propagates upward: a container whose children all rendered
//! nothing is itself omitted.
mod collections;
mod crossrefs;
mod senses;

use std::path::Path;

use lexi_config::{ConfigNode, ConfigNodeId, ConfigTree, ListId, NodeOptions};
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::ident::{Guid, ObjectId};
use crate::markup::{escape, Tag};
use crate::options::RenderOptions;
use crate::ports::{MediaKind, RenderEnvironment};
use crate::resolver::{Direction, FieldResolver, ResolveError, Resolved, ResolvedKind};
use crate::schema::{self, EntryRefInfo};
use crate::value::{MultiString, TsString, Value};

pub use senses::SenseRenderState;

/// Context threaded through one entry's recursion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Top-level entry being rendered.
    pub entry: Option<ObjectId>,
    /// Sense numbering context.
    pub sense: SenseRenderState,
    /// Direction of the relation type being labelled.
    pub direction: Direction,
}

impl RenderState {
    /// Fresh state for a top-level entry.
    pub fn for_entry(entry: ObjectId) -> Self {
        Self {
            entry: Some(entry),
            ..Self::default()
        }
    }

    fn with_direction(&self, direction: Direction) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }
}

/// Per-worker fragment generator.
#[derive(Debug)]
pub struct Generator<'a> {
    env: RenderEnvironment<'a>,
    tree: &'a ConfigTree,
    options: &'a RenderOptions,
    resolver: FieldResolver<'a>,
}

impl<'a> Generator<'a> {
    /// Generator with a fresh resolver cache.
    pub fn new(env: RenderEnvironment<'a>, tree: &'a ConfigTree, options: &'a RenderOptions) -> Self {
        Self {
            env,
            tree,
            options,
            resolver: FieldResolver::new(env, tree),
        }
    }

    /// Part of the configuration that renders `entry`.
    ///
    /// A part listing minor-entry types applies to entries with an enabled
    /// variant or complex-form type; otherwise the first enabled non-minor
    /// part whose field path names the entry's class is used.
    pub fn select_part(&self, entry: ObjectId) -> Option<ConfigNodeId> {
        let tree = self.tree;
        let accessor = self.env.accessor;
        let minor_list = |part: ConfigNodeId| {
            tree[part]
                .options
                .as_ref()
                .and_then(NodeOptions::list_options)
                .filter(|l| l.list_id == ListId::Minor)
        };
        let enabled = || tree.parts().iter().copied().filter(|p| tree[*p].enabled);

        if enabled().any(|p| minor_list(p).is_some()) {
            let types: Vec<String> = schema::objects(accessor, entry, schema::ENTRY_REFS)
                .into_iter()
                .flat_map(|r| EntryRefInfo::read(accessor, r).types)
                .map(|t| accessor.guid(t).to_string())
                .collect();
            let minor = enabled().find(|p| {
                minor_list(*p).is_some_and(|list| types.iter().any(|t| list.is_enabled(t)))
            });
            if minor.is_some() {
                return minor;
            }
        }
        let class = accessor.class_name(entry);
        enabled().find(|p| {
            minor_list(*p).is_none() && class.is_none_or(|c| tree[*p].field_path == c)
        })
    }

    /// Renders `entry` with the part [`Self::select_part`] picks; nothing
    /// when no part applies.
    pub fn generate_entry(&mut self, entry: ObjectId) -> Result<String, RenderError> {
        match self.select_part(entry) {
            Some(part) => self.generate_entry_with(entry, part),
            None => {
                debug!(?entry, "no configuration part applies");
                Ok(String::new())
            }
        }
    }

    /// Renders `entry` with an explicit part.
    pub fn generate_entry_with(
        &mut self,
        entry: ObjectId,
        part: ConfigNodeId,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        if tree[part].field_path.trim().is_empty() {
            return Err(RenderError::Configuration {
                path: tree.node_path(part),
                reason: "entry part has no field description".into(),
            });
        }
        let state = RenderState::for_entry(entry);
        let content = self.generate_children(entry, part, &state, &[])?;
        Ok(Tag::div()
            .class(tree.css_class(part))
            .attr("id", self.env.accessor.guid(entry).anchor())
            .wrap(&content))
    }

    /// Renders node `id` against `subject`.
    pub fn generate(
        &mut self,
        subject: ObjectId,
        id: ConfigNodeId,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let node = &tree[id];
        if !node.enabled {
            return Ok(String::new());
        }
        if node.is_grouping() {
            return self.generate_group(subject, id, state);
        }
        let resolved = match self.resolver.resolve(id, subject, state.direction) {
            Ok(Some(resolved)) => resolved,
            Ok(None) => return Ok(String::new()),
            Err(ResolveError::InvalidConfiguration { path }) => {
                return Err(RenderError::Configuration {
                    path,
                    reason: "root node has no field description".into(),
                })
            }
            Err(err) => {
                debug!(node = %self.diagnostic_label(id), error = %err, "field not resolved");
                return Ok(String::new());
            }
        };
        if resolved.value.is_empty() {
            return Ok(String::new());
        }
        let body = match resolved.kind {
            ResolvedKind::Collection => self.generate_collection(subject, id, resolved, state)?,
            ResolvedKind::Possibility | ResolvedKind::Form | ResolvedKind::Object => {
                match resolved.value {
                    Value::Object(obj) => self.generate_object(obj, id, state)?,
                    _ => String::new(),
                }
            }
            ResolvedKind::PictureFile | ResolvedKind::File => self.generate_file(id, &resolved),
            ResolvedKind::Paragraphs => self.generate_paragraphs(id, &resolved.value),
            ResolvedKind::Primitive => self.generate_primitive(subject, id, &resolved.value),
        };
        Ok(self.surround(node, body))
    }

    /// Concatenated output of the effective children of `id` against
    /// `subject`, leaving out `skip` and hidden custom fields.
    pub(crate) fn generate_children(
        &mut self,
        subject: ObjectId,
        id: ConfigNodeId,
        state: &RenderState,
        skip: &[ConfigNodeId],
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let hide_custom = tree[id].hide_custom_fields;
        let mut out = String::new();
        for &child in tree.effective_children(id) {
            if skip.contains(&child) || (hide_custom && tree[child].is_custom_field) {
                continue;
            }
            out.push_str(&self.generate(subject, child, state)?);
        }
        Ok(out)
    }

    fn generate_group(
        &mut self,
        subject: ObjectId,
        id: ConfigNodeId,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let node = &tree[id];
        let content = self.generate_children(subject, id, state, &[])?;
        let block = node
            .options
            .as_ref()
            .is_some_and(NodeOptions::display_each_in_paragraph);
        let html = Tag::block_if(block).class(tree.css_class(id)).wrap(&content);
        Ok(self.surround(node, html))
    }

    pub(crate) fn generate_object(
        &mut self,
        obj: ObjectId,
        id: ConfigNodeId,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let content = self.generate_children(obj, id, state, &[])?;
        Ok(Tag::span().class(self.node_class(id)).wrap(&content))
    }

    fn generate_file(&self, id: ConfigNodeId, resolved: &Resolved) -> String {
        let Value::File(file) = &resolved.value else {
            return String::new();
        };
        let kind = if resolved.kind == ResolvedKind::PictureFile {
            MediaKind::Picture
        } else {
            MediaKind::from_extension(&file.extension().unwrap_or_default())
        };
        let src = match self.env.files.resolve_media(file, kind) {
            Ok(src) => src,
            Err(err) => {
                warn!(file = %file.path, error = %err, "media file skipped");
                return String::new();
            }
        };
        let class = self.tree.css_class(id);
        let anchor = self.env.accessor.guid(file.id).anchor();
        let source = || Tag::new("source").attr("src", src.clone()).void();
        match kind {
            MediaKind::Picture => Tag::new("img")
                .class(class)
                .attr("src", src.clone())
                .attr("id", anchor)
                .void(),
            MediaKind::Audio => Tag::new("audio")
                .class(class)
                .attr("id", anchor)
                .wrap(&source()),
            MediaKind::Video => Tag::new("video")
                .class(class)
                .attr("id", anchor)
                .attr("controls", "controls")
                .wrap(&source()),
            MediaKind::Other => {
                let name = Path::new(&file.path)
                    .file_name()
                    .map_or_else(|| file.path.clone(), |n| n.to_string_lossy().into_owned());
                Tag::new("a")
                    .class(class)
                    .attr("href", src.clone())
                    .wrap(&escape(&name))
            }
        }
    }

    fn generate_paragraphs(&self, id: ConfigNodeId, value: &Value) -> String {
        let Value::Paragraphs(paragraphs) = value else {
            return String::new();
        };
        let body: String = paragraphs
            .iter()
            .map(|p| Tag::span().class("paragraph").wrap(&self.runs(p, None)))
            .collect();
        Tag::span().class(self.node_class(id)).wrap(&body)
    }

    fn generate_primitive(&self, subject: ObjectId, id: ConfigNodeId, value: &Value) -> String {
        let link = self.headword_link(subject, id);
        let content = match value {
            Value::String(s) => escape(s).into_owned(),
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.to_string(),
            Value::GenDate(g) => g.to_string(),
            Value::Rich(text) => self.runs(text, link),
            Value::Multi(multi) => return self.generate_multistring(id, multi, link),
            other => {
                debug!(node = %self.diagnostic_label(id), ?other, "value has no primitive rendering");
                String::new()
            }
        };
        Tag::span().class(self.node_class(id)).wrap(&content)
    }

    fn generate_multistring(&self, id: ConfigNodeId, multi: &MultiString, link: Option<Guid>) -> String {
        let node = &self.tree[id];
        let registry = self.env.writing_systems;
        let ws_options = node
            .options
            .as_ref()
            .and_then(NodeOptions::writing_system_options);

        let mut chosen: Vec<(String, &TsString)> = Vec::new();
        match ws_options {
            Some(options) => {
                for token in options.enabled_ids() {
                    let hit = registry
                        .resolve(token)
                        .into_iter()
                        .find_map(|ws| multi.get(&ws).map(|text| (ws, text)));
                    if let Some((ws, text)) = hit {
                        if !chosen.iter().any(|(seen, _)| *seen == ws) {
                            chosen.push((ws, text));
                        }
                    }
                }
            }
            None => chosen.extend(
                multi
                    .iter()
                    .find(|(_, text)| !text.is_empty())
                    .map(|(ws, text)| (ws.to_owned(), text)),
            ),
        }

        let abbreviate = ws_options.is_some_and(|o| o.display_abbreviations);
        let alternatives: Vec<String> = chosen
            .iter()
            .map(|(ws, text)| {
                let mut html = String::new();
                if abbreviate {
                    if let Some(info) = registry.writing_system(ws) {
                        html.push_str(
                            &Tag::span()
                                .class("writingsystemprefix")
                                .wrap(&escape(&info.abbreviation)),
                        );
                    }
                }
                html.push_str(&self.runs(text, link));
                html
            })
            .collect();
        let separator = self.literal(node.between.as_deref());
        Tag::span()
            .class(self.node_class(id))
            .wrap(&alternatives.join(&separator))
    }

    /// Runs of `text`, each tagged with its writing system, wrapped in a
    /// link to `link` when given.
    fn runs(&self, text: &TsString, link: Option<Guid>) -> String {
        let registry = self.env.writing_systems;
        let mut out = String::new();
        for run in text.runs.iter().filter(|r| !r.text.is_empty()) {
            let mut tag = Tag::span().attr("lang", run.ws.as_str());
            if registry
                .writing_system(&run.ws)
                .is_some_and(|ws| ws.right_to_left)
            {
                tag = tag.attr("dir", "rtl");
            }
            let html = tag.wrap(&escape(&run.text));
            match run.link.filter(|_| link.is_none()) {
                Some(target) => out.push_str(&anchor_to(target, &html)),
                None => out.push_str(&html),
            }
        }
        match link {
            Some(target) => anchor_to(target, &out),
            None => out,
        }
    }

    fn headword_link(&self, subject: ObjectId, id: ConfigNodeId) -> Option<Guid> {
        let node = &self.tree[id];
        let field = node
            .sub_field
            .as_deref()
            .or_else(|| node.field_path.rsplit('.').next())?;
        if !schema::is_headword_field(field) {
            return None;
        }
        let accessor = self.env.accessor;
        let entry = accessor.owning_entry(subject).unwrap_or(subject);
        Some(accessor.guid(entry))
    }

    /// Container class: the node's own class, plus the shared node's class
    /// when the node borrows a shared subtree.
    pub(crate) fn node_class(&self, id: ConfigNodeId) -> String {
        let tree = self.tree;
        let own = tree.css_class(id);
        match tree[id].referenced_node() {
            Some(shared) => {
                let shared = tree.css_class(shared);
                if shared == own {
                    own
                } else {
                    format!("{own} {shared}")
                }
            }
            None => own,
        }
    }

    /// Class of one item of a collection node: the node class without its
    /// plural `s`, or with `item` appended.
    pub(crate) fn item_class(&self, id: ConfigNodeId) -> String {
        let class = self.tree.css_class(id);
        match class.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => stem.to_owned(),
            _ => format!("{class}item"),
        }
    }

    /// Escaped separator literal, or nothing when separators are left to
    /// the stylesheet.
    pub(crate) fn literal(&self, text: Option<&str>) -> String {
        match text {
            Some(text) if self.options.inline_separators => escape(text).into_owned(),
            _ => String::new(),
        }
    }

    fn surround(&self, node: &ConfigNode, body: String) -> String {
        if body.is_empty() || !self.options.inline_separators {
            return body;
        }
        let before = self.literal(node.before.as_deref());
        let after = self.literal(node.after.as_deref());
        format!("{before}{body}{after}")
    }

    fn diagnostic_label(&self, id: ConfigNodeId) -> String {
        if cfg!(debug_assertions) {
            self.tree.node_path(id)
        } else {
            self.tree[id].label.clone()
        }
    }
}

fn anchor_to(target: Guid, content: &str) -> String {
    Tag::new("a")
        .attr("href", format!("#{}", target.anchor()))
        .wrap(content)
}
