use crate::extract::Extraction;

/// Line printed when an extraction found nothing
pub const EMPTY_MESSAGE: &str = "No fragments found.";

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Print the CSS path of each fragment under its header
    pub include_details: bool,
}

/// Plain text formatter for numbered fragment blocks
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, extraction: &Extraction) -> String {
        convert_to_text(extraction, &self.config)
    }
}

/// Render fragments as `=== Fragment N ===` blocks, numbered from 1
pub fn convert_to_text(extraction: &Extraction, config: &TextConfig) -> String {
    if extraction.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    extraction
        .fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| {
            let mut block = format!("=== Fragment {} ===\n", i + 1);
            if config.include_details {
                block.push_str(&format!("selector: {}\n", fragment.selector));
            }
            block.push_str(fragment.html.trim());
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FragmentExtractor;

    const TWO_FIELDS: &str = "<dl><div id='y'><dt>Year</dt><dd>2020</dd></div></dl>\
                              <ul><li id='z'><b>Year</b> <i>2020</i></li></ul>";

    #[test]
    fn test_empty() {
        assert_eq!(convert_to_text(&Extraction::default(), &TextConfig::default()), "No fragments found.");
    }

    #[test]
    fn test_numbered_blocks() {
        let extraction = FragmentExtractor::new().extract_detailed(TWO_FIELDS, "Year", "2020").unwrap();
        let text = TextFormatter::new(TextConfig::default()).convert(&extraction);

        assert_eq!(
            text,
            "=== Fragment 1 ===\n<div id=\"y\"><dt>Year</dt><dd>2020</dd></div>\n\n\
             === Fragment 2 ===\n<li id=\"z\"><b>Year</b> <i>2020</i></li>"
        );
    }

    #[test]
    fn test_details_line() {
        let extraction = FragmentExtractor::new().extract_detailed(TWO_FIELDS, "Year", "2020").unwrap();
        let text = convert_to_text(&extraction, &TextConfig { include_details: true });

        assert!(text.starts_with("=== Fragment 1 ===\nselector: html > body > dl > div#y\n<div"));
    }
}
