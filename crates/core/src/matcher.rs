//! Text search over a parsed document.
//!
//! Two retrieval modes share one predicate ([`TextQuery::matches`]):
//!
//! - [`find_text_nodes`] returns the text nodes whose own content matches.
//! - [`find_elements_by_text`] returns the elements whose whole descendant
//!   text matches.
//!
//! Exact matching compares trimmed, whitespace-collapsed strings. Partial
//! matching looks for the query as a substring of the raw content. Both fold
//! case unless the query is case sensitive.

use std::sync::LazyLock;

use ego_tree::{NodeId, NodeRef};
use regex::Regex;
use scraper::{ElementRef, Node};

use crate::parse::{Document, element_text, node_text};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// A text query with its matching rules.
///
/// The query side is folded and collapsed once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    text: String,
    exact: bool,
    case_sensitive: bool,
    needle: String,
}

impl TextQuery {
    pub fn new(text: impl Into<String>, exact: bool, case_sensitive: bool) -> Self {
        let text = text.into();
        let folded = fold(&text, case_sensitive);
        let needle = if exact { collapse_whitespace(&folded) } else { folded };
        Self { text, exact, case_sensitive, needle }
    }

    /// Exact, case-insensitive query.
    pub fn exact(text: impl Into<String>) -> Self {
        Self::new(text, true, false)
    }

    /// Substring, case-insensitive query.
    pub fn partial(text: impl Into<String>) -> Self {
        Self::new(text, false, false)
    }

    /// The text as given. Empty is allowed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whole-string equality (after trimming) instead of substring search.
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Compare without case folding.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Tests `content` against this query.
    pub fn matches(&self, content: &str) -> bool {
        let content = fold(content, self.case_sensitive);

        if self.exact {
            collapse_whitespace(&content) == self.needle
        } else {
            content.contains(self.needle.as_str())
        }
    }
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive { s.to_string() } else { s.to_lowercase() }
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// A node found by a text search.
#[derive(Debug, Clone, Copy)]
pub enum MatchedNode<'a> {
    /// A text node whose own content matched.
    Text(NodeRef<'a, Node>),
    /// An element whose full descendant text matched.
    Element(ElementRef<'a>),
}

impl<'a> MatchedNode<'a> {
    /// Stable arena id of the matched node.
    pub fn id(&self) -> NodeId {
        self.node().id()
    }

    /// The matched node as a plain tree node.
    pub fn node(&self) -> NodeRef<'a, Node> {
        match self {
            MatchedNode::Text(node) => *node,
            MatchedNode::Element(element) => **element,
        }
    }

    /// The text that was matched against.
    pub fn text(&self) -> String {
        match self {
            MatchedNode::Text(node) => node_text(node).unwrap_or_default().to_string(),
            MatchedNode::Element(element) => element_text(*element),
        }
    }

    /// Short single-line preview used in diagnostics.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.text();
        let trimmed = collapse_whitespace(&text);
        trimmed.chars().take(max_chars).collect()
    }
}

/// Finds every text node whose content matches `query`, in document order.
pub fn find_text_nodes<'a>(doc: &'a Document, query: &TextQuery) -> Vec<MatchedNode<'a>> {
    doc.nodes()
        .filter(|node| node_text(node).is_some_and(|text| query.matches(text)))
        .map(MatchedNode::Text)
        .collect()
}

/// Finds every element whose descendant text matches `query`, in document order.
///
/// Ancestors of a match usually match too when the query is partial, so the
/// result is typically nested (`html`, `body`, ..., the innermost element).
pub fn find_elements_by_text<'a>(doc: &'a Document, query: &TextQuery) -> Vec<MatchedNode<'a>> {
    doc.elements()
        .filter(|element| query.matches(&element_text(*element)))
        .map(MatchedNode::Element)
        .collect()
}
