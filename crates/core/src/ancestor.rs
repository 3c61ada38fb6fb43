//! Lowest common ancestor of two matched nodes.
//!
//! Each node is first resolved to its governing element (a text node to its
//! parent, an element to itself). Then the root-to-element paths of both are
//! compared from the top; the last position where they still agree is the
//! lowest common ancestor.
//!
//! Paths stop below the synthetic document node, so the document itself can
//! never be returned. `html` and `body` are still part of the path; filtering
//! them out is the caller's job.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use crate::matcher::MatchedNode;
use crate::{FieldprobeError, Result};

/// Resolves a matched node to the element that governs it.
///
/// Returns `Ok(None)` when a text node hangs directly off the document node.
///
/// # Errors
///
/// Returns [`FieldprobeError::Invariant`] for a text node without a parent.
pub fn governing_element<'a>(node: MatchedNode<'a>) -> Result<Option<ElementRef<'a>>> {
    match node {
        MatchedNode::Element(element) => Ok(Some(element)),
        MatchedNode::Text(text) => {
            let parent = text
                .parent()
                .ok_or_else(|| FieldprobeError::Invariant(format!("text node {:?} has no parent", text.id())))?;
            Ok(ElementRef::wrap(parent))
        }
    }
}

/// Builds the path from the top-most element down to `element`, inclusive.
///
/// The synthetic document node is excluded.
pub fn ancestor_path<'a>(element: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let node: NodeRef<'a, Node> = *element;
    let mut path: Vec<ElementRef<'a>> = std::iter::once(node)
        .chain(node.ancestors())
        .take_while(|n| !n.value().is_document())
        .filter_map(ElementRef::wrap)
        .collect();
    path.reverse();
    path
}

/// Computes the lowest common ancestor of two matched nodes.
///
/// A node may be its own ancestor: matching the same node twice, or an
/// element and one of its descendants, yields that element. Returns
/// `Ok(None)` when the nodes share no element ancestor, e.g. when they
/// come from two different documents.
///
/// # Example
///
/// ```rust
/// use fieldprobe_core::{Document, TextQuery, find_text_nodes, lowest_common_ancestor};
///
/// let doc = Document::parse("<div id='f'><dt>Year</dt><dd>2020</dd></div>");
/// let label = find_text_nodes(&doc, &TextQuery::exact("Year"))[0];
/// let value = find_text_nodes(&doc, &TextQuery::exact("2020"))[0];
///
/// let lca = lowest_common_ancestor(label, value).unwrap().unwrap();
/// assert_eq!(lca.value().attr("id"), Some("f"));
/// ```
pub fn lowest_common_ancestor<'a>(a: MatchedNode<'a>, b: MatchedNode<'a>) -> Result<Option<ElementRef<'a>>> {
    let (Some(a), Some(b)) = (governing_element(a)?, governing_element(b)?) else {
        return Ok(None);
    };

    let path_a = ancestor_path(a);
    let path_b = ancestor_path(b);

    let common = path_a
        .iter()
        .zip(path_b.iter())
        .take_while(|(x, y)| same_node(x, y))
        .last()
        .map(|(x, _)| *x);

    Ok(common)
}

/// Renders a path as a CSS child-combinator selector.
///
/// Each step is the tag name followed by `#id` and `.class` parts, e.g.
/// `html > body > main#book > div.row.field`.
pub fn css_path(path: &[ElementRef<'_>]) -> String {
    path.iter()
        .map(|element| css_step(*element))
        .collect::<Vec<_>>()
        .join(" > ")
}

fn css_step(element: ElementRef<'_>) -> String {
    let el = element.value();
    let mut step = el.name().to_lowercase();
    if let Some(id) = el.attr("id").filter(|id| !id.is_empty()) {
        step.push('#');
        step.push_str(id);
    }
    for class in el.attr("class").unwrap_or_default().split_whitespace() {
        step.push('.');
        step.push_str(class);
    }
    step
}

/// Identity comparison: same arena id in the same tree.
fn same_node(a: &ElementRef<'_>, b: &ElementRef<'_>) -> bool {
    let a: &NodeRef<'_, Node> = a;
    let b: &NodeRef<'_, Node> = b;
    a == b
}
