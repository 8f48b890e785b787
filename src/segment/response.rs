//! Parsing of raw model responses into detected items

use serde::Deserialize;

use super::coords::NormalizedBox;

/// One element of the model's JSON array.
///
/// `box_2d` is required; `mask` and `label` may be absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedItem {
    #[serde(rename = "box_2d")]
    pub box_2d: NormalizedBox,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl DetectedItem {
    /// The reported label, or `item_<index>` when absent.
    pub fn label_or_default(&self, index: usize) -> String {
        self.label.clone().unwrap_or_else(|| format!("item_{}", index))
    }
}

/// Extract the body of a ```` ```json ```` fenced block, if present.
///
/// The first line that is exactly ```` ```json ```` (ignoring surrounding
/// whitespace) opens the block; it ends at the next ```` ``` ````. Text with no
/// such line is returned unchanged.
pub fn strip_json_fence(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        if line.trim() == "```json" {
            let inner = &text[offset..];
            return match inner.find("```") {
                Some(end) => &inner[..end],
                None => inner,
            };
        }
    }
    text
}

/// Parse a model response (optionally fenced) into detected items.
pub fn parse_items(text: &str) -> Result<Vec<DetectedItem>, serde_json::Error> {
    serde_json::from_str(strip_json_fence(text))
}
