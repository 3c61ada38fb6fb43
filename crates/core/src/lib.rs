pub mod ancestor;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod matcher;
pub mod normalize;
pub mod parse;

pub use ancestor::{ancestor_path, css_path, governing_element, lowest_common_ancestor};
pub use error::{FieldprobeError, Result};
pub use extract::{ExtractConfig, ExtractConfigBuilder, Extraction, FragmentExtractor, FragmentInfo, SearchMode};
pub use extract::{extract_fragments, extract_fragments_with_config};
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{FetchConfig, MarkupSource, PageSession};
pub use fetch::{acquire, fetch_file, fetch_stdin, parse_url, rendered_source};
pub use formatters::{JsonConfig, JsonFormatter, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_text};
pub use matcher::{MatchedNode, TextQuery, find_elements_by_text, find_text_nodes};
pub use normalize::{NormalizeStats, normalize_in_place, normalized};
pub use parse::Document;
#[doc(hidden)]
pub use parse::{element_text, node_text, outer_html, tag_name};
