use crate::Result;
use crate::extract::{Extraction, FragmentInfo, SearchMode};
use serde::Serialize;

/// Complete JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Label query, absent for value-only runs
    pub label: Option<&'a str>,
    /// Value query
    pub value: &'a str,
    /// Search mode used
    pub mode: SearchMode,
    /// Fragment markup in discovery order
    pub fragments: Vec<&'a str>,
    /// Per-fragment details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a [FragmentInfo]>,
    /// Match counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<JsonStats>,
}

/// Match counters for JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JsonStats {
    pub label_matches: usize,
    pub value_matches: usize,
    pub pairs_tried: usize,
}

impl From<&Extraction> for JsonStats {
    fn from(extraction: &Extraction) -> Self {
        Self {
            label_matches: extraction.label_matches,
            value_matches: extraction.value_matches,
            pairs_tried: extraction.pairs_tried,
        }
    }
}

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Include selector, tag, depth and match counters
    pub include_details: bool,
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Convert an extraction to JSON
pub fn convert_to_json(
    extraction: &Extraction, label: Option<&str>, value: &str, mode: SearchMode, config: &JsonConfig,
) -> Result<String> {
    let report = JsonReport {
        label,
        value,
        mode,
        fragments: extraction.fragments.iter().map(|f| f.html.as_str()).collect(),
        details: config.include_details.then_some(extraction.fragments.as_slice()),
        stats: config.include_details.then(|| JsonStats::from(extraction)),
    };

    if config.pretty { Ok(serde_json::to_string_pretty(&report)?) } else { Ok(serde_json::to_string(&report)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, extraction: &Extraction, label: Option<&str>, value: &str, mode: SearchMode) -> Result<String> {
        convert_to_json(extraction, label, value, mode, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FragmentExtractor;
    use serde_json::Value;

    fn sample() -> Extraction {
        FragmentExtractor::new()
            .extract_detailed(
                "<div class='a'><span>Year published</span><span>2020</span></div>",
                "Year published",
                "2020",
            )
            .unwrap()
    }

    #[test]
    fn test_convert_to_json_shape() {
        let json = convert_to_json(&sample(), Some("Year published"), "2020", SearchMode::Text, &JsonConfig::default())
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["label"], "Year published");
        assert_eq!(parsed["value"], "2020");
        assert_eq!(parsed["mode"], "text");
        assert_eq!(parsed["fragments"].as_array().unwrap().len(), 1);
        assert!(parsed["fragments"][0].as_str().unwrap().starts_with("<div class=\"a\">"));
        assert!(parsed.get("details").is_none());
        assert!(parsed.get("stats").is_none());
    }

    #[test]
    fn test_value_only_label_is_null() {
        let json =
            convert_to_json(&Extraction::default(), None, "2020", SearchMode::Cleaned, &JsonConfig::default()).unwrap();
        assert_eq!(json, r#"{"label":null,"value":"2020","mode":"cleaned","fragments":[]}"#);
    }

    #[test]
    fn test_details() {
        let config = JsonConfig { include_details: true, pretty: true };
        let json = JsonFormatter::new(config).convert(&sample(), Some("Year published"), "2020", SearchMode::Text).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert!(json.contains('\n'));
        assert_eq!(parsed["details"][0]["tag"], "div");
        assert_eq!(parsed["details"][0]["selector"], "html > body > div.a");
        assert_eq!(parsed["details"][0]["depth"], 3);
        assert_eq!(parsed["stats"]["label_matches"], 1);
        assert_eq!(parsed["stats"]["pairs_tried"], 1);
    }
}
