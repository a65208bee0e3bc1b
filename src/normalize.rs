//! Analysis-response normalizer.
//!
//! The vision endpoint is supposed to answer `{ "danger": bool,
//! "description": string }`, but the model behind it routinely leaks other
//! shapes: a bare description string, a JSON document wrapped in prose,
//! markdown fences, or half-escaped fragments. `normalize` accepts any
//! `serde_json::Value` and always produces a usable [`AnalysisResult`]:
//!
//! 1. well-formed object — pass through, coercing field types;
//! 2. string that parses as such an object — parse, then (1);
//! 3. anything else — keyword scan for the danger flag plus a
//!    best-effort description recovery, falling back to a fixed phrase.
//!
//! This function is total. Whatever arrives, the user hears *something*.

use serde_json::Value;

/// Spoken/displayed when no usable description can be recovered.
pub const FALLBACK_DESCRIPTION: &str = "No se pudo analizar la imagen";

/// Lowercased substrings that mark a free-text response as a hazard warning.
const DANGER_KEYWORDS: &[&str] = &["peligro", "cuidado", "precaución", "alerta"];

/// Sentence openers the model uses; a salvage anchor when JSON artifacts
/// remain embedded in a recovered description.
const SENTENCE_MARKERS: &[&str] = &["delante tuya", "cuidado"];

/// A normalized analysis outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// The scene contains an immediate physical hazard.
    pub danger: bool,
    /// Natural-language scene description, never empty.
    pub description: String,
}

/// Normalize a raw endpoint payload into an [`AnalysisResult`].
pub fn normalize(raw: &Value) -> AnalysisResult {
    match raw {
        Value::Object(fields) => {
            let danger = coerce_danger(fields.get("danger"));
            let description = match fields.get("description") {
                Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
                Some(Value::Null) | None => FALLBACK_DESCRIPTION.to_string(),
                Some(other) => other.to_string(),
            };
            AnalysisResult {
                danger,
                description: scrub(&description),
            }
        }
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Object(_)) => normalize(&parsed),
            // A string that parses to a scalar ("true", "42") is no more
            // structured than the raw text; recover from the text itself.
            _ => recover_from_text(text),
        },
        Value::Null => AnalysisResult {
            danger: false,
            description: FALLBACK_DESCRIPTION.to_string(),
        },
        other => recover_from_text(&other.to_string()),
    }
}

/// Normalize a raw text payload (non-JSON transport, degraded endpoints).
pub fn normalize_text(raw: &str) -> AnalysisResult {
    normalize(&Value::String(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Heuristic recovery
// ---------------------------------------------------------------------------

fn recover_from_text(text: &str) -> AnalysisResult {
    let lowered = text.to_lowercase();
    let danger = DANGER_KEYWORDS.iter().any(|k| lowered.contains(k));

    let description = extract_description_value(text)
        .or_else(|| strip_structural(text))
        .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());

    AnalysisResult {
        danger,
        description: scrub(&description),
    }
}

/// Pull the quoted value following a `"description"` key out of a JSON-ish
/// fragment, tolerating a missing opening or closing quote.
fn extract_description_value(text: &str) -> Option<String> {
    let key_at = find_ci(text, "\"description\"").or_else(|| find_ci(text, "description"))?;
    let after_key = &text[key_at..];
    let colon = after_key.find(':')?;
    let mut rest = after_key[colon + 1..].trim_start();
    if let Some(stripped) = rest.strip_prefix('"') {
        rest = stripped;
    }
    let value = match rest.find('"') {
        Some(end) => &rest[..end],
        None => rest,
    };
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Remove structural JSON punctuation and known schema tokens, keeping
/// whatever prose is left.
fn strip_structural(text: &str) -> Option<String> {
    let spaced: String = text
        .chars()
        .map(|c| match c {
            '{' | '}' | '[' | ']' | '"' | ':' | ',' | '`' => ' ',
            other => other,
        })
        .collect();

    let kept: Vec<&str> = spaced
        .split_whitespace()
        .filter(|word| {
            !matches!(
                word.to_lowercase().as_str(),
                "json" | "danger" | "description" | "true" | "false" | "null"
            )
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(" "))
    }
}

/// Final cleanup pass applied to every recovered description: if structural
/// artifacts survived, salvage the natural-language tail anchored on a known
/// sentence opener; never return an empty string.
fn scrub(description: &str) -> String {
    let mut out = description.trim().to_string();

    let has_artifacts = out.contains('{') || out.contains('}') || find_ci(&out, "json").is_some();
    if has_artifacts {
        if let Some(sentence) = salvage_sentence(&out) {
            out = sentence;
        }
    }

    let out = out.trim();
    if out.is_empty() {
        FALLBACK_DESCRIPTION.to_string()
    } else {
        out.to_string()
    }
}

fn salvage_sentence(text: &str) -> Option<String> {
    let start = SENTENCE_MARKERS
        .iter()
        .filter_map(|marker| find_ci(text, marker))
        .min()?;
    let tail = &text[start..];
    let end = tail.find(|c| c == '{' || c == '}').unwrap_or(tail.len());
    let sentence = tail[..end].trim();
    if sentence.is_empty() {
        None
    } else {
        Some(sentence.to_string())
    }
}

/// JS-style truthiness, restrained: the literal string `"false"` must not
/// count as dangerous.
fn coerce_danger(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// ASCII-case-insensitive substring search. The needles used in this module
/// are all ASCII, so byte positions are valid char boundaries.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}
