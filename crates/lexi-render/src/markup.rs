// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimal XHTML element writer.
use std::borrow::Cow;
use std::fmt::Write as _;

/// Escapes text content.
pub fn escape(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escapes an attribute value (double-quoted).
pub fn escape_attr(text: &str) -> Cow<'_, str> {
    escape_with(text, true)
}

fn escape_with(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !text.contains(needs) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// An element with attributes, written around already-escaped content.
#[derive(Debug, Clone)]
pub(crate) struct Tag<'a> {
    name: &'static str,
    attrs: Vec<(&'static str, Cow<'a, str>)>,
}

impl<'a> Tag<'a> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    pub(crate) fn span() -> Self {
        Self::new("span")
    }

    pub(crate) fn div() -> Self {
        Self::new("div")
    }

    /// `div` when `block`, else `span`.
    pub(crate) fn block_if(block: bool) -> Self {
        if block {
            Self::div()
        } else {
            Self::span()
        }
    }

    /// Adds `class`, skipped when empty.
    pub(crate) fn class(self, class: impl Into<Cow<'a, str>>) -> Self {
        let class = class.into();
        if class.is_empty() {
            self
        } else {
            self.attr("class", class)
        }
    }

    pub(crate) fn attr(mut self, name: &'static str, value: impl Into<Cow<'a, str>>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    fn open_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
    }

    /// `<name attrs>content</name>`, or nothing when `content` is empty.
    pub(crate) fn wrap(&self, content: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(content.len() + 32);
        self.open_into(&mut out);
        out.push('>');
        out.push_str(content);
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
        out
    }

    /// Self-closing `<name attrs/>`.
    pub(crate) fn void(&self) -> String {
        let mut out = String::new();
        self.open_into(&mut out);
        out.push_str("/>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
        assert_eq!(escape("say \"hi\""), "say \"hi\"");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn wrap_skips_empty_content() {
        let tag = Tag::span().class("gloss").attr("lang", "en");
        assert_eq!(tag.wrap("dog"), r#"<span class="gloss" lang="en">dog</span>"#);
        assert_eq!(tag.wrap(""), "");
        assert_eq!(Tag::span().class("").wrap("x"), "<span>x</span>");
        assert_eq!(Tag::new("img").attr("src", "a&b.png").void(), r#"<img src="a&amp;b.png"/>"#);
    }
}
