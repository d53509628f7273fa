// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Document assembly: the XHTML shell around per-entry fragments.
use std::io::Write;

use lexi_config::{ConfigNodeId, ConfigTree};
use rustc_hash::FxHashSet;
use tracing::{debug, info, instrument};
use unicode_normalization::UnicodeNormalization;

use crate::dispatch::{self, DispatchFailure, ProgressHandle};
use crate::error::RenderError;
use crate::generator::Generator;
use crate::ident::ObjectId;
use crate::letters::LetterTracker;
use crate::markup::{escape, Tag};
use crate::options::RenderOptions;
use crate::pagination::{self, PageRange};
use crate::ports::RenderEnvironment;

/// A rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// NFC-normalized XHTML.
    pub markup: String,
    /// CSS rules for every styled node.
    pub stylesheet_fragment: String,
    /// Page layout of the whole entry list.
    pub pages: Vec<PageRange>,
}

/// Renders page [`RenderOptions::current_page`] of `entries` as a complete
/// document, with page controls when there is more than one page.
#[instrument(skip_all, fields(entries = entries.len(), page_size = page_size))]
pub fn render_document(
    env: &RenderEnvironment<'_>,
    entries: &[ObjectId],
    config: &ConfigTree,
    page_size: usize,
    options: &RenderOptions,
) -> Result<Document, RenderError> {
    config.validate()?;
    let pages = pagination::compute_pages(entries.len(), page_size);
    let current = if pages.is_empty() {
        None
    } else {
        let page = pages.get(options.current_page).copied().ok_or_else(|| {
            RenderError::InvalidPagination(format!(
                "page {} requested but there are {} pages",
                options.current_page,
                pages.len()
            ))
        })?;
        Some(page)
    };

    let assembler = Assembler {
        env: *env,
        tree: config,
        options,
    };
    let controls = pagination::page_controls(&pages, options.current_page);
    let mut markup = assembler.head();
    markup.push_str(&controls);
    if let Some(page) = current {
        let progress = ProgressHandle::new();
        let mut letters = LetterTracker::new();
        markup.push_str(&assembler.render_batch(
            &entries[page.start..=page.end],
            page.start,
            &progress,
            &mut letters,
        )?);
    }
    markup.push_str(&controls);
    markup.push_str(TAIL);
    info!(pages = pages.len(), "document rendered");
    Ok(Document {
        markup: markup.nfc().collect(),
        stylesheet_fragment: stylesheet_fragment(env, config),
        pages,
    })
}

/// Renders every entry to `sink`, one page-sized batch at a time.
///
/// Returns the batches written. Cancellation through `progress` is honoured
/// between entries; the sink then holds a truncated document.
#[instrument(skip_all, fields(entries = entries.len(), page_size = page_size))]
pub fn render_document_to<W: Write>(
    env: &RenderEnvironment<'_>,
    entries: &[ObjectId],
    config: &ConfigTree,
    page_size: usize,
    options: &RenderOptions,
    progress: &ProgressHandle,
    sink: &mut W,
) -> Result<Vec<PageRange>, RenderError> {
    config.validate()?;
    let pages = pagination::compute_pages(entries.len(), page_size);
    let assembler = Assembler {
        env: *env,
        tree: config,
        options,
    };
    sink.write_all(assembler.head().nfc().collect::<String>().as_bytes())?;
    let mut letters = LetterTracker::new();
    for page in &pages {
        if progress.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        let batch = assembler.render_batch(
            &entries[page.start..=page.end],
            page.start,
            progress,
            &mut letters,
        )?;
        sink.write_all(batch.nfc().collect::<String>().as_bytes())?;
        debug!(start = page.start, end = page.end, "batch written");
    }
    sink.write_all(TAIL.as_bytes())?;
    sink.flush()?;
    info!(pages = pages.len(), "document streamed");
    Ok(pages)
}

/// `.class { css }` for every enabled node with a style the resolver
/// knows, in tree order, one rule per class.
pub fn stylesheet_fragment(env: &RenderEnvironment<'_>, config: &ConfigTree) -> String {
    fn visit(
        env: &RenderEnvironment<'_>,
        tree: &ConfigTree,
        id: ConfigNodeId,
        seen: &mut FxHashSet<String>,
        out: &mut String,
    ) {
        let node = &tree[id];
        if !node.enabled {
            return;
        }
        if let Some(css) = node.style.as_deref().and_then(|s| env.styles.css_for(s)) {
            let class = tree.css_class(id);
            if seen.insert(class.clone()) {
                out.push_str(&format!(".{class} {{ {css} }}\n"));
            }
        }
        for &child in tree.children(id) {
            visit(env, tree, child, seen, out);
        }
    }

    let mut seen = FxHashSet::default();
    let mut out = String::new();
    for &root in config.parts().iter().chain(config.shared_items()) {
        visit(env, config, root, &mut seen, &mut out);
    }
    out
}

const TAIL: &str = "</body>\n</html>\n";

struct Assembler<'a> {
    env: RenderEnvironment<'a>,
    tree: &'a ConfigTree,
    options: &'a RenderOptions,
}

impl<'a> Assembler<'a> {
    fn head(&self) -> String {
        let mut out = String::from(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head>\n",
        );
        out.push_str("<meta charset=\"utf-8\"/>\n");
        out.push_str(&format!("<title>{}</title>\n", escape(&self.options.title)));
        if let Some(href) = &self.options.stylesheet_href {
            out.push_str(
                &Tag::new("link")
                    .attr("href", href.as_str())
                    .attr("rel", "stylesheet")
                    .attr("type", "text/css")
                    .void(),
            );
            out.push('\n');
        }
        for ws in self.env.writing_systems.all() {
            let lang = if ws.language_tag.is_empty() {
                ws.id.as_str()
            } else {
                ws.language_tag.as_str()
            };
            out.push_str(
                &Tag::new("meta")
                    .attr("name", ws.id.as_str())
                    .attr("content", ws.default_font.as_str())
                    .attr("lang", lang)
                    .void(),
            );
            out.push('\n');
        }
        out.push_str("</head>\n<body>\n");
        out
    }

    /// Renders `batch` in parallel and stitches the fragments together in
    /// order, with letter headings. `offset` is the index of `batch[0]` in
    /// the full entry list.
    fn render_batch(
        &self,
        batch: &[ObjectId],
        offset: usize,
        progress: &ProgressHandle,
        letters: &mut LetterTracker,
    ) -> Result<String, RenderError> {
        let (env, tree, options) = (self.env, self.tree, self.options);
        let workers = dispatch::pool_size(batch.len(), options.max_workers);
        let fragments = dispatch::parallel_map_ordered(
            batch,
            workers,
            progress,
            || Generator::new(env, tree, options),
            |generator: &mut Generator<'a>, _, entry| generator.generate_entry(*entry),
        )
        .map_err(|failure| match failure {
            DispatchFailure::Failed { index, error } => RenderError::Worker {
                index: offset + index,
                source: Box::new(error),
            },
            DispatchFailure::Cancelled => RenderError::Cancelled,
        })?;

        let mut out = String::new();
        for (entry, fragment) in batch.iter().zip(fragments) {
            if fragment.is_empty() {
                continue;
            }
            if options.letter_headings {
                if let Some(heading) = letters.observe(&env, *entry) {
                    out.push_str(&heading);
                }
            }
            out.push_str(&fragment);
            out.push('\n');
        }
        Ok(out)
    }
}
