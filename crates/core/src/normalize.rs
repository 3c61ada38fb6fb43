//! Tree normalization: comment stripping and text-run coalescing.
//!
//! The HTML parser splits logical text whenever a comment, an entity boundary
//! or a script-inserted fragment interrupts it, so `Year <!-- x -->published`
//! arrives as two text nodes. Normalizing first removes every comment, then
//! merges each run of adjacent text siblings into the first node of the run.
//!
//! Elements are never created, removed or moved, so every element keeps its
//! [`NodeId`]. Only text-node granularity changes.

use ego_tree::NodeId;
use scraper::Node;

use crate::parse::Document;

/// Counts of what a normalization pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Comment nodes detached from the tree.
    pub comments_removed: usize,
    /// Text nodes folded into a preceding sibling.
    pub text_nodes_merged: usize,
}

impl NormalizeStats {
    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.comments_removed == 0 && self.text_nodes_merged == 0
    }
}

/// Normalizes a copy of `doc`, leaving the source untouched.
pub fn normalized(doc: &Document) -> Document {
    let mut copy = doc.clone();
    normalize_in_place(&mut copy);
    copy
}

/// Removes comments and merges adjacent text nodes, mutating `doc`.
///
/// Running it a second time is a no-op.
pub fn normalize_in_place(doc: &mut Document) -> NormalizeStats {
    let comments_removed = remove_comments(doc);
    let text_nodes_merged = merge_text_runs(doc);

    let stats = NormalizeStats { comments_removed, text_nodes_merged };
    tracing::trace!(
        comments_removed = stats.comments_removed,
        text_nodes_merged = stats.text_nodes_merged,
        "normalized document tree"
    );
    stats
}

fn remove_comments(doc: &mut Document) -> usize {
    // Collect first; detaching while walking would invalidate the traversal.
    let comments: Vec<NodeId> = doc
        .nodes()
        .filter(|node| node.value().is_comment())
        .map(|node| node.id())
        .collect();

    let tree = &mut doc.html_mut().tree;
    for id in &comments {
        if let Some(mut node) = tree.get_mut(*id) {
            node.detach();
        }
    }

    comments.len()
}

fn merge_text_runs(doc: &mut Document) -> usize {
    let parents: Vec<NodeId> = doc
        .nodes()
        .filter(|node| node.has_children())
        .map(|node| node.id())
        .collect();

    let mut merged = 0;
    for parent in parents {
        let children: Vec<(NodeId, bool)> = match doc.node(parent) {
            Some(node) => node.children().map(|child| (child.id(), child.value().is_text())).collect(),
            None => continue,
        };

        let mut run_head: Option<NodeId> = None;
        for (id, is_text) in children {
            if !is_text {
                run_head = None;
                continue;
            }
            match run_head {
                None => run_head = Some(id),
                Some(head) => {
                    fold_into(doc, head, id);
                    merged += 1;
                }
            }
        }
    }

    merged
}

/// Appends the text of `tail` to `head` and detaches `tail`.
fn fold_into(doc: &mut Document, head: NodeId, tail: NodeId) {
    let tree = &mut doc.html_mut().tree;

    let tail_text = match tree.get(tail).map(|node| node.value()) {
        Some(Node::Text(text)) => text.text.clone(),
        _ => return,
    };

    if let Some(mut head_node) = tree.get_mut(head)
        && let Node::Text(text) = head_node.value()
    {
        text.text.push_tendril(&tail_text);
    }

    if let Some(mut tail_node) = tree.get_mut(tail) {
        tail_node.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{element_text, node_text};

    fn text_children(doc: &Document, selector: &str) -> Vec<String> {
        let el = doc.select(selector).unwrap()[0];
        el.children()
            .filter_map(|child| node_text(&child).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_removes_comments() {
        let mut doc = Document::parse("<div><!-- a --><p>x</p><!-- b --></div>");
        assert_eq!(doc.comment_count(), 2);

        let stats = normalize_in_place(&mut doc);
        assert_eq!(stats.comments_removed, 2);
        assert_eq!(doc.comment_count(), 0);
    }

    #[test]
    fn test_merges_across_removed_comment() {
        let mut doc = Document::parse("<p>Year <!-- split -->published</p>");
        assert_eq!(text_children(&doc, "p").len(), 2);

        let stats = normalize_in_place(&mut doc);
        assert_eq!(stats.text_nodes_merged, 1);
        assert_eq!(text_children(&doc, "p"), vec!["Year published"]);
    }

    #[test]
    fn test_element_interrupts_run() {
        let mut doc = Document::parse("<p>a<!--c-->b<br>c<!--d-->d</p>");
        normalize_in_place(&mut doc);

        assert_eq!(text_children(&doc, "p"), vec!["ab", "cd"]);
        assert_eq!(element_text(doc.select("p").unwrap()[0]), "abcd");
    }

    #[test]
    fn test_idempotent() {
        let mut doc = Document::parse("<div>a<!--x-->b<span>c<!--y-->d</span></div>");
        let first = normalize_in_place(&mut doc);
        assert!(!first.is_noop());

        let comments = doc.comment_count();
        let texts = doc.text_node_count();
        let second = normalize_in_place(&mut doc);

        assert!(second.is_noop());
        assert_eq!(doc.comment_count(), comments);
        assert_eq!(doc.text_node_count(), texts);
    }

    #[test]
    fn test_element_ids_survive() {
        let mut doc = Document::parse("<div id='f'>a<!--x-->b<span>c</span></div>");
        let before: Vec<NodeId> = doc.elements().map(|el| el.id()).collect();

        normalize_in_place(&mut doc);
        let after: Vec<NodeId> = doc.elements().map(|el| el.id()).collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_normalized_leaves_source_untouched() {
        let doc = Document::parse("<p>a<!--x-->b</p>");
        let copy = normalized(&doc);

        assert_eq!(doc.comment_count(), 1);
        assert_eq!(copy.comment_count(), 0);
        assert_eq!(text_children(&doc, "p").len(), 2);
        assert_eq!(text_children(&copy, "p"), vec!["ab"]);
    }
}
