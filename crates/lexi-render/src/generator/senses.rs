// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sense lists: numbering, outline numbers for sub-senses, and hoisting of
//! grammatical info every sense shares.
use lexi_config::{ConfigNodeId, NodeOptions, SenseOptions};

use super::{Generator, RenderState};
use crate::error::RenderError;
use crate::ident::ObjectId;
use crate::markup::{escape, Tag};
use crate::ports::ObjectKind;
use crate::schema;

/// Numbering context of the sense being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenseRenderState {
    /// 1-based position of the sense in its list.
    pub counter: usize,
    /// Full number of the sense (e.g. `2b`), or the nearest numbered
    /// ancestor's when the sense itself is unnumbered.
    pub outline: String,
}

impl Generator<'_> {
    /// Renders `senses` (already filtered and ordered) owned by `owner`.
    pub(super) fn generate_senses(
        &mut self,
        owner: ObjectId,
        id: ConfigNodeId,
        senses: &[ObjectId],
        options: &SenseOptions,
        state: &RenderState,
    ) -> Result<String, RenderError> {
        let tree = self.tree;
        let accessor = self.env.accessor;
        let filter = self.env.filter;
        let is_sub_list = accessor.object_kind(owner) == ObjectKind::Sense;

        let mut out = String::new();
        let mut skip = Vec::new();
        if options.show_shared_grammar_first {
            let gram = tree
                .child_with_field(id, schema::GRAMMATICAL_INFO)
                .filter(|g| tree[*g].enabled);
            if let Some(gram) = gram {
                if let Some(shared) = self.shared_grammatical_info(owner, gram, senses, is_sub_list, state)? {
                    skip.push(gram);
                    // A sub-sense list sharing its owner's info shows it nowhere.
                    if !is_sub_list {
                        out.push_str(&Tag::span().class("sharedgrammaticalinfo").wrap(&shared));
                    }
                }
            }
        }

        let sub_list = tree.effective_children(id).iter().copied().find(|c| {
            tree[*c].enabled && tree[*c].options.as_ref().and_then(NodeOptions::sense_options).is_some()
        });
        let sub_numbered = sub_list
            .and_then(|c| tree[c].options.as_ref())
            .and_then(NodeOptions::sense_options)
            .is_some_and(|o| o.numbering_style.is_numbered());

        for (index, &sense) in senses.iter().enumerate() {
            let has_numbered_subs = sub_numbered
                && sub_list.is_some_and(|c| {
                    schema::objects(accessor, sense, &tree[c].field_path)
                        .iter()
                        .any(|s| !filter.is_excluded(*s))
                });
            let numbered = options.numbering_style.is_numbered()
                && (senses.len() > 1 || options.number_even_single || has_numbered_subs);
            let number = if numbered {
                options
                    .parent_number_style
                    .compose(&state.sense.outline, &options.numbering_style.format(index + 1))
            } else {
                String::new()
            };
            let child_state = RenderState {
                sense: SenseRenderState {
                    counter: index + 1,
                    outline: if numbered {
                        number.clone()
                    } else {
                        state.sense.outline.clone()
                    },
                },
                ..state.clone()
            };
            let body = self.generate_children(sense, id, &child_state, &skip)?;
            if body.is_empty() {
                continue;
            }
            let number_html = if numbered {
                self.sense_number(options, &number)
            } else {
                String::new()
            };
            let entry = accessor
                .owning_entry(sense)
                .or(state.entry)
                .map(|e| accessor.guid(e).anchor())
                .unwrap_or_default();
            let sense_html = Tag::span()
                .class("sense")
                .attr("entryguid", entry)
                .wrap(&body);
            let block = options.display_each_in_paragraph && !(options.display_first_inline && index == 0);
            out.push_str(
                &Tag::block_if(block)
                    .class("sensecontent")
                    .wrap(&(number_html + &sense_html)),
            );
        }
        Ok(out)
    }

    fn sense_number(&self, options: &SenseOptions, number: &str) -> String {
        let text = if self.options.inline_separators {
            format!("{}{number}{}", options.before_number, options.after_number)
        } else {
            number.to_owned()
        };
        Tag::span().class("sensenumber").wrap(&escape(&text))
    }

    /// The grammatical info fragment, when every sense (and, for a sub-sense
    /// list, the owning sense) renders the same non-empty fragment.
    fn shared_grammatical_info(
        &mut self,
        owner: ObjectId,
        gram: ConfigNodeId,
        senses: &[ObjectId],
        is_sub_list: bool,
        state: &RenderState,
    ) -> Result<Option<String>, RenderError> {
        let probe = RenderState {
            entry: state.entry,
            ..RenderState::default()
        };
        let mut shared: Option<String> = None;
        let subjects = is_sub_list.then_some(owner).into_iter().chain(senses.iter().copied());
        for subject in subjects {
            let rendered = self.generate(subject, gram, &probe)?;
            if rendered.is_empty() {
                return Ok(None);
            }
            match &shared {
                None => shared = Some(rendered),
                Some(first) if *first == rendered => {}
                Some(_) => return Ok(None),
            }
        }
        Ok(shared)
    }
}
