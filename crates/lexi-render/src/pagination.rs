// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Splitting an entry list into pages.
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::markup::Tag;

/// A trailing remainder of at most `page_size / ABSORB_DIVISOR` entries is
/// folded into the last full page instead of getting a page of its own.
pub const ABSORB_DIVISOR: usize = 10;

/// Inclusive range of entry indices shown on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRange {
    /// First entry index.
    pub start: usize,
    /// Last entry index (inclusive).
    pub end: usize,
}

impl PageRange {
    /// Number of entries on the page.
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Always `false`: a page holds at least one entry.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Which adjacent page to take entries from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// The page before the current one.
    Previous,
    /// The page after the current one.
    Next,
}

/// Contiguous, non-overlapping pages covering `0..count`.
///
/// `page_size == 0` puts everything on one page.
pub fn compute_pages(count: usize, page_size: usize) -> Vec<PageRange> {
    if count == 0 {
        return Vec::new();
    }
    if page_size == 0 || count <= page_size {
        return vec![PageRange {
            start: 0,
            end: count - 1,
        }];
    }
    let full = count / page_size;
    let remainder = count % page_size;
    let mut pages: Vec<PageRange> = (0..full)
        .map(|i| PageRange {
            start: i * page_size,
            end: i * page_size + page_size - 1,
        })
        .collect();
    if remainder > 0 {
        match pages.last_mut() {
            Some(last) if remainder * ABSORB_DIVISOR <= page_size => last.end = count - 1,
            _ => pages.push(PageRange {
                start: full * page_size,
                end: count - 1,
            }),
        }
    }
    pages
}

/// Moves up to `n` entries from the `neighbor` of page `current` into it.
/// A neighbour left empty is removed.
pub fn merge_from_neighbor(
    pages: &[PageRange],
    current: usize,
    neighbor: Neighbor,
    n: usize,
) -> Result<Vec<PageRange>, RenderError> {
    let other = match neighbor {
        Neighbor::Previous => current.checked_sub(1),
        Neighbor::Next => current.checked_add(1),
    }
    .filter(|i| *i < pages.len() && current < pages.len())
    .ok_or_else(|| {
        RenderError::InvalidPagination(format!(
            "page {current} has no {neighbor:?} neighbour among {} pages",
            pages.len()
        ))
    })?;
    let mut pages = pages.to_vec();
    let moved = n.min(pages[other].len());
    if moved == 0 {
        return Ok(pages);
    }
    let emptied = moved == pages[other].len();
    match neighbor {
        Neighbor::Previous => {
            pages[current].start -= moved;
            if !emptied {
                pages[other].end -= moved;
            }
        }
        Neighbor::Next => {
            pages[current].end += moved;
            if !emptied {
                pages[other].start += moved;
            }
        }
    }
    if emptied {
        pages.remove(other);
    }
    Ok(pages)
}

/// Page-button bar, or nothing for a single page.
pub fn page_controls(pages: &[PageRange], current: usize) -> String {
    if pages.len() < 2 {
        return String::new();
    }
    let buttons: String = pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let mut tag = Tag::span()
                .class("pagebutton")
                .attr("startIndex", page.start.to_string())
                .attr("endIndex", page.end.to_string());
            if index == current {
                tag = tag.attr("id", "currentPageButton");
            }
            tag.wrap(&format!("{}-{}", page.start + 1, page.end + 1))
        })
        .collect();
    format!("{}\n", Tag::div().class("pages").wrap(&buttons))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn range(start: usize, end: usize) -> PageRange {
        PageRange { start, end }
    }

    #[test]
    fn remainder_over_ten_percent_gets_its_own_page() {
        assert_eq!(
            compute_pages(2350, 1000),
            vec![range(0, 999), range(1000, 1999), range(2000, 2349)]
        );
    }

    #[test]
    fn small_remainder_is_absorbed() {
        assert_eq!(compute_pages(1050, 1000), vec![range(0, 1049)]);
        assert_eq!(compute_pages(2100, 1000), vec![range(0, 999), range(1000, 2099)]);
        assert_eq!(compute_pages(2101, 1000).len(), 3);
    }

    #[test]
    fn degenerate_sizes() {
        assert!(compute_pages(0, 10).is_empty());
        assert_eq!(compute_pages(7, 0), vec![range(0, 6)]);
        assert_eq!(compute_pages(7, 10), vec![range(0, 6)]);
    }

    #[test]
    fn merge_from_next_shifts_boundary() {
        let pages = compute_pages(30, 10);
        let merged = merge_from_neighbor(&pages, 0, Neighbor::Next, 4).unwrap();
        assert_eq!(merged, vec![range(0, 13), range(14, 19), range(20, 29)]);
    }

    #[test]
    fn merge_drops_emptied_neighbour() {
        let pages = compute_pages(30, 10);
        let merged = merge_from_neighbor(&pages, 2, Neighbor::Previous, 25).unwrap();
        assert_eq!(merged, vec![range(0, 9), range(10, 29)]);
    }

    #[test]
    fn merge_without_neighbour_is_an_error() {
        let pages = compute_pages(30, 10);
        assert!(merge_from_neighbor(&pages, 0, Neighbor::Previous, 1).is_err());
        assert!(merge_from_neighbor(&pages, 2, Neighbor::Next, 1).is_err());
    }

    #[test]
    fn controls_mark_current_page() {
        let html = page_controls(&compute_pages(25, 10), 1);
        assert!(html.starts_with(r#"<div class="pages">"#));
        assert!(html.contains(r#"startIndex="10" endIndex="19" id="currentPageButton""#));
        assert!(page_controls(&compute_pages(5, 10), 0).is_empty());
    }
}
