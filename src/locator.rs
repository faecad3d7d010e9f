//! Locating embedded JSON payloads in a set page
//!
//! Two conventions are tried, in priority order:
//! - a hydration-data `<script id=".." type="application/json">` tag
//! - an inline page-data call, e.g. `Quizlet.setPageData({...})`

use scraper::{Html, Selector};
use tracing::debug;

use crate::config::Heuristics;

/// Raw JSON blocks found in `html`, highest priority first
pub fn locate_json_blocks(html: &str, heuristics: &Heuristics) -> Vec<String> {
    let mut blocks = Vec::with_capacity(2);

    if let Some(block) = extract_json_script(html, &heuristics.hydration_script_id) {
        debug!(bytes = block.len(), "found hydration data script");
        blocks.push(block);
    }
    if let Some(block) = extract_page_data(html, &heuristics.page_data_marker) {
        debug!(bytes = block.len(), "found inline page data");
        blocks.push(block.to_string());
    }

    blocks
}

/// Text of the first `<script>` with the given id and a JSON type
pub fn extract_json_script(html: &str, id: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!(r#"script[id="{id}"][type="application/json"]"#)).ok()?;

    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Balanced `{...}` region starting at the first brace after `marker`
///
/// Braces are counted naively, including any inside string literals.
pub fn extract_page_data<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let start = html.find(marker)?;
    let brace_start = start + html[start..].find('{')?;

    let mut depth = 0usize;
    for (offset, byte) in html.as_bytes()[brace_start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&html[brace_start..=brace_start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
