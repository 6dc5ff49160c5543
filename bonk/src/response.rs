use std::sync::LazyLock;

use regex::Regex;

/// Shown in the narrative where the HTML block used to be.
pub const CODE_PLACEHOLDER: &str = "[Code successfully compiled to Workspace]";

static HTML_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```html(.*?)```").expect("valid html fence regex"));

// Unanchored to line starts: `$` without the `m` flag is end of input, so the
// lazy capture always runs to the end of the response. The optional prefix
// only eats an opening `**`; in `**Vibe Upgrades:**` the closing pair stays
// in the tail and comes back as a `*` upgrade.
static UPGRADES_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:###|\*\*)?\s*Vibe Upgrades[:\s]*(.*?)$").expect("valid upgrades regex")
});

const BULLETS: [char; 3] = ['-', '*', '•'];

/// A model reply split into the parts the front-end displays separately.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParsedResponse {
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upgrades: Vec<String>,
}

impl ParsedResponse {
    /// Split a raw reply. Total over all inputs: markers that don't match are
    /// left in the narrative untouched.
    pub fn parse(raw: &str) -> Self {
        Self {
            narrative: narrative(raw),
            code: extract_code(raw),
            upgrades: extract_upgrades(raw),
        }
    }
}

/// Convenience alias for [`ParsedResponse::parse`].
pub fn parse(raw: &str) -> ParsedResponse {
    ParsedResponse::parse(raw)
}

/// Trimmed body of the first ```html block. Empty bodies count as absent.
pub fn extract_code(raw: &str) -> Option<String> {
    let body = HTML_BLOCK.captures(raw)?.get(1)?.as_str().trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Bullet lines following the "Vibe Upgrades" heading, markers stripped.
pub fn extract_upgrades(raw: &str) -> Vec<String> {
    let Some(tail) = UPGRADES_SECTION.captures(raw).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    tail.as_str()
        .lines()
        .filter_map(|line| line.trim().strip_prefix(BULLETS))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn narrative(raw: &str) -> String {
    let replaced = HTML_BLOCK.replace(raw, CODE_PLACEHOLDER);
    let cleaned = UPGRADES_SECTION.replace(&replaced, "");
    cleaned.trim().to_string()
}
