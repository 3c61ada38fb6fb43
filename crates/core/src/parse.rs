//! HTML parsing and tree access.
//!
//! This module provides the [`Document`] type, a parsed HTML tree whose nodes
//! live in an arena and are addressed by stable [`NodeId`]s. Every other
//! component works against a `Document`: the normalizer rewrites its text
//! nodes, the matcher scans it, and the ancestor resolver walks its parent links.
//!
//! # Example
//!
//! ```rust
//! use fieldprobe_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <div class="field"><span>Year published</span><span>2020</span></div>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let fields = doc.select("div.field").unwrap();
//! assert_eq!(fields.len(), 1);
//! ```

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

use crate::{FieldprobeError, Result};

/// Represents a parsed HTML document.
///
/// A Document owns the whole node arena. Cloning it copies the arena, and the
/// clone keeps the same [`NodeId`] for every node, so ids taken from one copy
/// still name the corresponding node in the other.
///
/// # Example
///
/// ```rust
/// use fieldprobe_core::parse::Document;
///
/// let doc = Document::parse("<p>Hello</p>");
/// assert!(doc.text_content().contains("Hello"));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    ///
    /// Markup that lacks `html`, `head` or `body` gets them synthesized by the
    /// HTML5 tree builder, so a bare `<div>` ends up under `body`.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Wraps an already-parsed `scraper::Html` tree.
    pub fn from_html(html: Html) -> Self {
        Self { html }
    }

    /// Gets the underlying `scraper::Html` instance.
    pub fn html(&self) -> &Html {
        &self.html
    }

    pub(crate) fn html_mut(&mut self) -> &mut Html {
        &mut self.html
    }

    /// Gets the entire document serialized back to HTML.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// The synthetic document node at the top of the tree.
    pub fn root(&self) -> NodeRef<'_, Node> {
        self.html.tree.root()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Looks up an element by id.
    ///
    /// Returns `None` when the id is unknown or names a non-element node.
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    /// Iterates every node reachable from the root in document (pre-order) order.
    ///
    /// Nodes detached by normalization are still allocated in the arena but are
    /// not reachable, so they never show up here.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, Node>> {
        self.root().descendants()
    }

    /// Iterates every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.nodes().filter_map(ElementRef::wrap)
    }

    /// Number of comment nodes reachable from the root.
    pub fn comment_count(&self) -> usize {
        self.nodes().filter(|node| node.value().is_comment()).count()
    }

    /// Number of text nodes reachable from the root.
    pub fn text_node_count(&self) -> usize {
        self.nodes().filter(|node| node.value().is_text()).count()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`FieldprobeError::InvalidArgument`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| FieldprobeError::InvalidArgument(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).collect())
    }

    /// Gets the title of the document.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// Serializes an element including its own tags.
pub fn outer_html(element: ElementRef<'_>) -> String {
    element.html()
}

/// Concatenates every text node below an element, without touching whitespace.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Returns the lowercase tag name of an element.
pub fn tag_name(element: ElementRef<'_>) -> String {
    element.value().name().to_lowercase()
}

/// Gets the text held by a text node, or `None` for any other node kind.
pub fn node_text<'a>(node: &NodeRef<'a, Node>) -> Option<&'a str> {
    node.value().as_text().map(|text| &**text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Test Page</title>
        </head>
        <body>
            <!-- sidebar -->
            <dl class="details">
                <dt>Year published</dt>
                <dd>2020</dd>
            </dl>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let dts = doc.select("dl.details dt").unwrap();

        assert_eq!(dts.len(), 1);
        assert_eq!(element_text(dts[0]), "Year published");
        assert_eq!(tag_name(dts[0]), "dt");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(FieldprobeError::InvalidArgument(_))));
    }

    #[test]
    fn test_fragment_gets_wrapped() {
        let doc = Document::parse("<div><span>a</span></div>");
        let tags: Vec<String> = doc.elements().map(tag_name).collect();

        assert_eq!(tags, vec!["html", "head", "body", "div", "span"]);
        assert!(doc.root().value().is_document());
    }

    #[test]
    fn test_clone_keeps_node_ids() {
        let doc = Document::parse(SAMPLE_HTML);
        let dd = doc.select("dd").unwrap()[0];
        let copy = doc.clone();

        let same = copy.element(dd.id()).unwrap();
        assert_eq!(tag_name(same), "dd");
        assert_eq!(outer_html(same), outer_html(dd));
    }

    #[test]
    fn test_counts() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.comment_count(), 1);
        assert!(doc.text_node_count() > 2);
    }

    #[test]
    fn test_from_html() {
        let html = Html::parse_document(SAMPLE_HTML);
        let doc = Document::from_html(html);

        assert_eq!(doc.title(), Some("Test Page".to_string()));
        assert_eq!(doc.comment_count(), 1);
        assert_eq!(element_text(doc.select("dd").unwrap()[0]), "2020");
    }

    #[test]
    fn test_node_text() {
        let doc = Document::parse("<p>Hello</p>");
        let text = doc.nodes().find(|n| n.value().is_text()).unwrap();
        assert_eq!(node_text(&text), Some("Hello"));
        assert_eq!(node_text(&doc.root()), None);
    }
}
