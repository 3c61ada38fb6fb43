//! Label/value fragment extraction.
//!
//! This module provides the primary API. Given markup, a label such as
//! `"Year published"` and a value such as `"2020"`, it finds every pairing of
//! a label match with a value match, takes their lowest common ancestor, and
//! returns the outer HTML of each distinct ancestor found.
//!
//! # Example
//!
//! ```rust
//! use fieldprobe_core::extract_fragments;
//!
//! let html = "<div><span>Year published</span><span>2020</span></div>";
//! let fragments = extract_fragments(html, "Year published", "2020").unwrap();
//! assert_eq!(fragments, vec![html.to_string()]);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use ego_tree::NodeId;
use scraper::ElementRef;
use serde::Serialize;

use crate::ancestor::{ancestor_path, css_path, lowest_common_ancestor};
use crate::fetch::{MarkupSource, acquire};
use crate::matcher::{MatchedNode, TextQuery, find_elements_by_text, find_text_nodes};
use crate::normalize::{normalize_in_place, normalized};
use crate::parse::{Document, outer_html, tag_name};
use crate::{FieldprobeError, Result};

/// Ancestors too coarse to be a useful fragment. The document node itself is
/// never an ancestor candidate in the first place.
const COARSE_CONTAINERS: &[&str] = &["html", "body"];

/// Characters of matched text shown in the verbose trace.
const PREVIEW_CHARS: usize = 50;

/// How label and value occurrences are located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Match individual text nodes.
    #[default]
    Text,
    /// Match elements by their full descendant text.
    Element,
    /// Match text nodes on a normalized copy of the tree (comments removed,
    /// adjacent text merged).
    Cleaned,
}

impl FromStr for SearchMode {
    type Err = FieldprobeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "element" => Ok(Self::Element),
            "cleaned" => Ok(Self::Cleaned),
            _ => Err(FieldprobeError::InvalidArgument(format!(
                "Unknown search mode: {}. Valid options: text, element, cleaned",
                s
            ))),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Element => "element",
            Self::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}

/// Configuration for fragment extraction.
///
/// # Example
///
/// ```rust
/// use fieldprobe_core::{ExtractConfig, SearchMode};
///
/// let config = ExtractConfig::builder()
///     .exact_value(false)
///     .all_matches(false)
///     .search_mode(SearchMode::Cleaned)
///     .build();
/// assert!(config.exact_label);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Label must equal a node's trimmed text (default: true).
    pub exact_label: bool,

    /// Value must equal a node's trimmed text (default: true).
    pub exact_value: bool,

    /// Compare without case folding (default: false).
    pub case_sensitive: bool,

    /// Collect every distinct fragment instead of stopping at the first (default: true).
    pub all_matches: bool,

    /// Emit a per-pair diagnostic trace through `tracing` (default: false).
    pub verbose: bool,

    /// Where matching happens (default: [`SearchMode::Text`]).
    pub search_mode: SearchMode,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            exact_label: true,
            exact_value: true,
            case_sensitive: false,
            all_matches: true,
            verbose: false,
            search_mode: SearchMode::Text,
        }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }

    fn label_query(&self, label: &str) -> TextQuery {
        TextQuery::new(label, self.exact_label, self.case_sensitive)
    }

    fn value_query(&self, value: &str) -> TextQuery {
        TextQuery::new(value, self.exact_value, self.case_sensitive)
    }
}

/// Builder for ExtractConfig.
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Sets whether the label must match exactly.
    pub fn exact_label(mut self, value: bool) -> Self {
        self.config.exact_label = value;
        self
    }

    /// Sets whether the value must match exactly.
    pub fn exact_value(mut self, value: bool) -> Self {
        self.config.exact_value = value;
        self
    }

    /// Sets case-sensitive comparison.
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.config.case_sensitive = value;
        self
    }

    /// Sets whether to collect all fragments or stop at the first.
    pub fn all_matches(mut self, value: bool) -> Self {
        self.config.all_matches = value;
        self
    }

    /// Sets the diagnostic trace flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.config.verbose = value;
        self
    }

    /// Sets the search mode.
    pub fn search_mode(mut self, value: SearchMode) -> Self {
        self.config.search_mode = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One extracted fragment with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentInfo {
    /// Outer HTML of the ancestor element.
    pub html: String,
    /// Tag name of the ancestor element.
    pub tag: String,
    /// CSS path from `html` down to the ancestor, e.g. `html > body > div.field`.
    pub selector: String,
    /// Depth of the ancestor below the document (the `html` element is 1).
    pub depth: usize,
    /// Position of the label match that produced it, in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_index: Option<usize>,
    /// Position of the value match that produced it, in document order.
    pub value_index: usize,
}

/// The result of an extraction, with match counts for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Distinct fragments in discovery order.
    pub fragments: Vec<FragmentInfo>,
    /// Number of label matches found.
    pub label_matches: usize,
    /// Number of value matches found.
    pub value_matches: usize,
    /// Number of (label, value) pairs examined before returning.
    pub pairs_tried: usize,
}

impl Extraction {
    /// True when no fragment was found.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Drops the diagnostics, keeping the fragment markup in order.
    pub fn into_html(self) -> Vec<String> {
        self.fragments.into_iter().map(|f| f.html).collect()
    }
}

/// Which matcher a pass uses once `Cleaned` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchTarget {
    TextNodes,
    Elements,
}

impl MatchTarget {
    fn find<'a>(self, doc: &'a Document, query: &TextQuery) -> Vec<MatchedNode<'a>> {
        match self {
            Self::TextNodes => find_text_nodes(doc, query),
            Self::Elements => find_elements_by_text(doc, query),
        }
    }
}

/// Accepts candidate ancestors, skipping coarse containers and repeats.
struct FragmentCollector {
    seen: HashSet<NodeId>,
    fragments: Vec<FragmentInfo>,
    verbose: bool,
}

impl FragmentCollector {
    fn new(verbose: bool) -> Self {
        Self { seen: HashSet::new(), fragments: Vec::new(), verbose }
    }

    /// Returns true when `ancestor` was appended.
    fn offer(&mut self, ancestor: Option<ElementRef<'_>>, label_index: Option<usize>, value_index: usize) -> bool {
        let Some(ancestor) = ancestor else {
            if self.verbose {
                tracing::debug!("no common ancestor");
            }
            return false;
        };

        let tag = tag_name(ancestor);
        if COARSE_CONTAINERS.contains(&tag.as_str()) {
            if self.verbose {
                tracing::debug!(tag = %tag, "skipped top-level container");
            }
            return false;
        }

        if !self.seen.insert(ancestor.id()) {
            if self.verbose {
                tracing::debug!(tag = %tag, "skipped ancestor already emitted");
            }
            return false;
        }

        let path = ancestor_path(ancestor);
        let fragment = FragmentInfo {
            html: outer_html(ancestor),
            selector: css_path(&path),
            depth: path.len(),
            tag,
            label_index,
            value_index,
        };
        if self.verbose {
            tracing::debug!(tag = %fragment.tag, selector = %fragment.selector, "added fragment");
        }
        self.fragments.push(fragment);
        true
    }
}

/// Main entry point for fragment extraction.
///
/// # Example
///
/// ```rust
/// use fieldprobe_core::{ExtractConfig, FragmentExtractor};
///
/// let html = r#"
///     <div class="a"><span>Year published</span><span>2020</span></div>
///     <div class="a"><span>Year published</span><span>2021</span></div>
/// "#;
/// let extractor = FragmentExtractor::with_config(ExtractConfig::builder().all_matches(false).build());
/// let fragments = extractor.extract(html, "Year published", "2020").unwrap();
/// assert_eq!(fragments.len(), 1);
/// assert!(fragments[0].contains("2020"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FragmentExtractor {
    config: ExtractConfig,
}

impl FragmentExtractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Creates an extractor with a custom configuration.
    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Parses `html` and extracts the fragments enclosing `label` and `value`.
    ///
    /// Returns an empty list when nothing matches.
    pub fn extract(&self, html: &str, label: &str, value: &str) -> Result<Vec<String>> {
        Ok(self.extract_detailed(html, label, value)?.into_html())
    }

    /// Like [`extract`](Self::extract), keeping per-fragment diagnostics.
    pub fn extract_detailed(&self, html: &str, label: &str, value: &str) -> Result<Extraction> {
        let mut doc = Document::parse(html);
        let target = match self.config.search_mode {
            SearchMode::Text => MatchTarget::TextNodes,
            SearchMode::Element => MatchTarget::Elements,
            SearchMode::Cleaned => {
                // Nobody else holds this tree, so it can be normalized in place.
                normalize_in_place(&mut doc);
                MatchTarget::TextNodes
            }
        };
        self.run_pairs(&doc, target, label, value)
    }

    /// Acquires markup from `source`, then extracts from it.
    ///
    /// Acquisition errors are returned as-is.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fieldprobe_core::{FetchConfig, FragmentExtractor, MarkupSource};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let source = MarkupSource::StaticFetch {
    ///         url: "https://example.com/book/42".to_string(),
    ///         config: FetchConfig::default(),
    ///     };
    ///     let fragments = FragmentExtractor::new().extract_from_source(&source, "Year published", "2020").await?;
    ///     println!("{} fragments", fragments.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn extract_from_source(&self, source: &MarkupSource<'_>, label: &str, value: &str) -> Result<Vec<String>> {
        let html = acquire(source).await?;
        self.extract(&html, label, value)
    }

    /// Extracts from an already-parsed document.
    ///
    /// `doc` is never modified: [`SearchMode::Cleaned`] works on a normalized copy.
    pub fn extract_from_document(&self, doc: &Document, label: &str, value: &str) -> Result<Vec<String>> {
        Ok(self.extract_document_detailed(doc, label, value)?.into_html())
    }

    /// Like [`extract_from_document`](Self::extract_from_document), keeping diagnostics.
    pub fn extract_document_detailed(&self, doc: &Document, label: &str, value: &str) -> Result<Extraction> {
        match self.config.search_mode {
            SearchMode::Text => self.run_pairs(doc, MatchTarget::TextNodes, label, value),
            SearchMode::Element => self.run_pairs(doc, MatchTarget::Elements, label, value),
            SearchMode::Cleaned => self.run_pairs(&normalized(doc), MatchTarget::TextNodes, label, value),
        }
    }

    /// Extracts the containers of `value` alone.
    ///
    /// Every value match is paired with itself, so each candidate is the
    /// match's governing element (its parent, for a text node). The usual
    /// `html`/`body` exclusion, identity dedupe and `all_matches` rules apply.
    pub fn extract_value_fragments(&self, doc: &Document, value: &str) -> Result<Extraction> {
        let cleaned;
        let (doc, target) = match self.config.search_mode {
            SearchMode::Text => (doc, MatchTarget::TextNodes),
            SearchMode::Element => (doc, MatchTarget::Elements),
            SearchMode::Cleaned => {
                cleaned = normalized(doc);
                (&cleaned, MatchTarget::TextNodes)
            }
        };

        let values = target.find(doc, &self.config.value_query(value));
        self.trace_matches("value", value, &values);

        let mut extraction = Extraction { value_matches: values.len(), ..Default::default() };
        let mut collector = FragmentCollector::new(self.config.verbose);

        for (value_index, node) in values.iter().enumerate() {
            extraction.pairs_tried += 1;
            let ancestor = lowest_common_ancestor(*node, *node)?;
            if collector.offer(ancestor, None, value_index) && !self.config.all_matches {
                break;
            }
        }

        extraction.fragments = collector.fragments;
        self.trace_total(&extraction);
        Ok(extraction)
    }

    fn run_pairs(&self, doc: &Document, target: MatchTarget, label: &str, value: &str) -> Result<Extraction> {
        if self.config.verbose {
            tracing::debug!(mode = %self.config.search_mode, "searching document");
        }

        let labels = target.find(doc, &self.config.label_query(label));
        let values = target.find(doc, &self.config.value_query(value));
        self.trace_matches("label", label, &labels);
        self.trace_matches("value", value, &values);

        let mut extraction =
            Extraction { label_matches: labels.len(), value_matches: values.len(), ..Default::default() };

        if labels.is_empty() || values.is_empty() {
            if self.config.verbose {
                tracing::debug!("label or value not found, nothing to pair");
            }
            return Ok(extraction);
        }

        let mut collector = FragmentCollector::new(self.config.verbose);

        'pairs: for (label_index, label_node) in labels.iter().enumerate() {
            for (value_index, value_node) in values.iter().enumerate() {
                extraction.pairs_tried += 1;
                if self.config.verbose {
                    tracing::debug!(
                        pair = extraction.pairs_tried,
                        label = %label_node.preview(PREVIEW_CHARS),
                        value = %value_node.preview(PREVIEW_CHARS),
                        "resolving pair"
                    );
                }

                let ancestor = lowest_common_ancestor(*label_node, *value_node)?;
                if collector.offer(ancestor, Some(label_index), value_index) && !self.config.all_matches {
                    break 'pairs;
                }
            }
        }

        extraction.fragments = collector.fragments;
        self.trace_total(&extraction);
        Ok(extraction)
    }

    fn trace_matches(&self, role: &str, query: &str, found: &[MatchedNode<'_>]) {
        if !self.config.verbose {
            return;
        }
        tracing::debug!(role, query, count = found.len(), "matched nodes");
        if let Some(first) = found.first() {
            tracing::debug!(role, sample = %first.preview(PREVIEW_CHARS), "first match");
        }
    }

    fn trace_total(&self, extraction: &Extraction) {
        if self.config.verbose {
            tracing::debug!(
                fragments = extraction.fragments.len(),
                pairs = extraction.pairs_tried,
                "extraction finished"
            );
        }
    }
}

/// Convenience function for one-liner extraction with defaults.
pub fn extract_fragments(html: &str, label: &str, value: &str) -> Result<Vec<String>> {
    FragmentExtractor::new().extract(html, label, value)
}

/// Convenience function for one-liner extraction with a custom configuration.
pub fn extract_fragments_with_config(
    html: &str, label: &str, value: &str, config: &ExtractConfig,
) -> Result<Vec<String>> {
    FragmentExtractor::with_config(config.clone()).extract(html, label, value)
}
