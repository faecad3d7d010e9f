//! Heuristic term-list search over arbitrary JSON
//!
//! The set page embeds its data in a JSON tree whose shape changes between
//! site versions. Rather than binding to a schema, every object and array
//! is visited once and the longest list of convertible term pairs wins.
//! Ties keep the list visited first. Children are pushed in document order
//! onto a stack, so later siblings are visited before earlier ones.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Heuristics;
use crate::types::{ImportResult, TermPair};

const CARD_SIDES_FIELD: &str = "cardSides";
const SIDE_LABEL_FIELD: &str = "label";
const MEDIA_FIELD: &str = "media";
const RICH_TEXT_FIELD: &str = "richText";
const TITLE_FIELD: &str = "title";
const SET_FIELD: &str = "set";

/// Parse `json_text` and return the best term list and title in it
///
/// Invalid JSON yields an empty result so the caller can move on to the
/// next candidate block.
pub fn extract_best(json_text: &str, heuristics: &Heuristics) -> ImportResult {
    match serde_json::from_str::<Value>(json_text) {
        Ok(root) => find_best_terms_and_title(&root, heuristics),
        Err(e) => {
            debug!(error = %e, "candidate block is not valid JSON");
            ImportResult::default()
        }
    }
}

/// Walk `root` and keep the longest term list found
pub fn find_best_terms_and_title(root: &Value, heuristics: &Heuristics) -> ImportResult {
    let mut best = ImportResult::default();
    let mut stack: Vec<&Value> = vec![root];
    let mut seen: HashSet<*const Value> = HashSet::new();

    while let Some(node) = stack.pop() {
        if !(node.is_object() || node.is_array()) {
            continue;
        }
        if !seen.insert(node as *const Value) {
            continue;
        }

        match node {
            Value::Array(items) => {
                let terms = parse_terms(items.iter(), heuristics);
                if terms.len() > best.terms.len() {
                    best.terms = terms;
                }
                stack.extend(items.iter());
            }
            Value::Object(record) => {
                for field in &heuristics.term_collection_fields {
                    let terms = match record.get(field) {
                        Some(Value::Array(items)) => parse_terms(items.iter(), heuristics),
                        Some(Value::Object(by_id)) => parse_terms(by_id.values(), heuristics),
                        _ => continue,
                    };
                    if terms.len() > best.terms.len() {
                        best.terms = terms;
                        if let Some(title) = record_title(record) {
                            best.title = title.to_string();
                        }
                    }
                }
                stack.extend(record.values());
            }
            _ => {}
        }
    }

    best
}

fn record_title(record: &Map<String, Value>) -> Option<&str> {
    record
        .get(TITLE_FIELD)
        .and_then(Value::as_str)
        .or_else(|| record.get(SET_FIELD)?.get(TITLE_FIELD)?.as_str())
}

fn parse_terms<'a, I>(entries: I, heuristics: &Heuristics) -> Vec<TermPair>
where
    I: Iterator<Item = &'a Value>,
{
    entries
        .filter_map(|entry| to_term_pair(entry, heuristics))
        .collect()
}

/// Interpret one element of a candidate list as a term pair
pub fn to_term_pair(value: &Value, heuristics: &Heuristics) -> Option<TermPair> {
    let Value::Object(record) = value else {
        return None;
    };

    if let Some(Value::Array(sides)) = record.get(CARD_SIDES_FIELD) {
        return pair_from_card_sides(sides, heuristics);
    }

    let word = plain_field(record, &heuristics.word_fields)
        .or_else(|| rich_field(record, &heuristics.word_rich_fields, heuristics))?;
    let definition = plain_field(record, &heuristics.definition_fields)
        .or_else(|| rich_field(record, &heuristics.definition_rich_fields, heuristics))?;

    TermPair::new(&word, &definition)
}

fn pair_from_card_sides(sides: &[Value], heuristics: &Heuristics) -> Option<TermPair> {
    let word_side =
        labelled_side(sides, &heuristics.word_side_labels).or_else(|| sides.first());
    let definition_side =
        labelled_side(sides, &heuristics.definition_side_labels).or_else(|| sides.get(1));

    let word = pick_text(word_side?, heuristics);
    let definition = pick_text(definition_side?, heuristics);
    TermPair::new(&word, &definition)
}

fn labelled_side<'a>(sides: &'a [Value], labels: &[String]) -> Option<&'a Value> {
    sides.iter().find(|side| {
        side.get(SIDE_LABEL_FIELD)
            .and_then(Value::as_str)
            .map(str::trim)
            .is_some_and(|label| {
                !label.is_empty() && labels.iter().any(|l| l.eq_ignore_ascii_case(label))
            })
    })
}

/// First of `fields` holding a non-blank string, trimmed
fn plain_field(record: &Map<String, Value>, fields: &[String]) -> Option<String> {
    fields.iter().find_map(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

fn rich_field(record: &Map<String, Value>, fields: &[String], heuristics: &Heuristics) -> Option<String> {
    fields.iter().find_map(|field| {
        let text = pick_text(record.get(field)?, heuristics);
        (!text.is_empty()).then_some(text)
    })
}

/// Pull display text out of a plain string or a rich content value
///
/// Recursion stops at `heuristics.max_text_depth`.
pub fn pick_text(value: &Value, heuristics: &Heuristics) -> String {
    pick_text_at(value, heuristics, 0)
}

fn pick_text_at(value: &Value, heuristics: &Heuristics, depth: usize) -> String {
    if depth > heuristics.max_text_depth {
        return String::new();
    }

    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Object(record) => {
            if let Some(text) = plain_field(record, &heuristics.text_fields) {
                return text;
            }
            if let Some(Value::Array(media)) = record.get(MEDIA_FIELD) {
                let text = first_text(media, heuristics, depth);
                if !text.is_empty() {
                    return text;
                }
            }
            match record.get(RICH_TEXT_FIELD) {
                Some(rich) => pick_text_at(rich, heuristics, depth + 1),
                None => String::new(),
            }
        }
        Value::Array(items) => first_text(items, heuristics, depth),
        _ => String::new(),
    }
}

fn first_text(items: &[Value], heuristics: &Heuristics, depth: usize) -> String {
    items
        .iter()
        .map(|item| pick_text_at(item, heuristics, depth + 1))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}
