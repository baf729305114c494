//! Lenient decoding of model replies.
//!
//! Models wrap JSON in markdown fences, prepend chatter, or return an object
//! where a list was asked for. Anything that still does not decode becomes
//! [`Classification::Unparsable`]; nothing here returns an error.

use serde_json::Value;

use crate::classifier::{Classification, Finding};
use crate::hints::Hints;

/// Keyword hints longer than this are descriptions, not search terms.
const MAX_KEYWORD_CHARS: usize = 64;

/// Remove a surrounding markdown code fence, if any.
#[must_use]
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = if let Some((_, rest)) = trimmed.split_once("```json") {
        rest
    } else if let Some((_, rest)) = trimmed.split_once("```") {
        rest
    } else {
        return trimmed;
    };
    body.split_once("```").map_or(body, |(inner, _)| inner).trim()
}

/// Decode the first JSON value found in a reply.
fn decode(raw: &str) -> Option<Value> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    [('[', ']'), ('{', '}')].iter().find_map(|&(open, close)| {
        let start = text.find(open)?;
        let end = text.rfind(close)?;
        (start < end)
            .then(|| serde_json::from_str(&text[start..=end]).ok())
            .flatten()
    })
}

fn text_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn line_field(obj: &serde_json::Map<String, Value>) -> Option<u32> {
    ["line", "line_offset", "line_number"]
        .iter()
        .find_map(|k| obj.get(*k))
        .and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .and_then(|n| u32::try_from(n).ok())
}

fn finding(item: &Value) -> Option<Finding> {
    let obj = item.as_object()?;
    let finding = Finding {
        line_offset: line_field(obj),
        violating_code: text_field(obj, &["violating_code", "code"]),
        explanation: text_field(obj, &["explanation", "reason"]),
        rule_violated: text_field(obj, &["rule_violated", "rule"]),
    };
    let empty = finding.violating_code.is_empty()
        && finding.explanation.is_empty()
        && finding.rule_violated.is_empty();
    (!empty).then_some(finding)
}

/// Interpret a classifier reply.
///
/// Accepts a JSON array of findings or an object holding one under
/// `violations`. Array items that are not finding objects are dropped.
#[must_use]
pub fn parse_findings(raw: &str) -> Classification {
    let unparsable = || Classification::Unparsable {
        raw: raw.to_string(),
    };
    let Some(value) = decode(raw) else {
        return unparsable();
    };
    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("violations") {
            Some(Value::Array(items)) => items,
            _ => return unparsable(),
        },
        _ => return unparsable(),
    };
    Classification::Violations(items.iter().filter_map(finding).collect())
}

/// Normalise a model-suggested extension to `.ext`, rejecting globs and paths.
fn sanitize_extension(raw: &str) -> Option<String> {
    let cleaned = raw.trim().replace("**/", "").replace("*/", "").replace('*', "");
    let ext = if cleaned.starts_with('.') {
        cleaned
    } else {
        format!(".{cleaned}")
    };
    (ext.len() > 1 && !ext.contains('/') && !ext.contains(char::is_whitespace)).then_some(ext)
}

fn strings(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => obj
                .get("pattern")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn keep_keyword(keyword: &str) -> bool {
    keyword.chars().count() <= MAX_KEYWORD_CHARS
}

/// Interpret a hint reply. `None` when nothing usable was found.
///
/// Understands `{"globs", "keywords", "extensions", "refined_patterns"}`
/// objects and bare arrays (of extensions, or of keywords).
#[must_use]
pub fn parse_hints(raw: &str) -> Option<Hints> {
    let value = decode(raw)?;
    let mut hints = Hints::default();
    match &value {
        Value::Object(obj) => {
            hints.globs = strings(obj.get("globs"));
            hints.extensions = strings(obj.get("extensions"))
                .iter()
                .filter_map(|e| sanitize_extension(e))
                .collect();
            hints.keywords = strings(obj.get("keywords"));
            hints.keywords.extend(strings(obj.get("refined_patterns")));
        }
        Value::Array(_) => {
            let items = strings(Some(&value));
            let all_extensions = items.iter().all(|s| s.starts_with('.') || s.starts_with('*'));
            if all_extensions {
                hints.extensions = items
                    .iter()
                    .filter_map(|e| sanitize_extension(e))
                    .collect();
            } else {
                hints.keywords = items;
            }
        }
        _ => return None,
    }
    hints.keywords.retain(|k| keep_keyword(k));
    (!hints.is_empty()).then_some(hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[]", "[]")]
    #[case("```json\n[1]\n```", "[1]")]
    #[case("```\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("  plain  ", "plain")]
    fn fences(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_fences(raw), expected);
    }

    #[test]
    fn empty_list_means_no_violations() {
        assert_eq!(parse_findings("[]"), Classification::Violations(vec![]));
    }

    #[test]
    fn findings_from_fenced_array() {
        let raw = r#"Here you go:
```json
[{"line": 10, "violating_code": "password = req.form['password']",
  "explanation": "stored in plain text", "rule_violated": "Passwords must be hashed"}]
```"#;
        let Classification::Violations(found) = parse_findings(raw) else {
            panic!("expected violations");
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line_offset, Some(10));
        assert_eq!(found[0].rule_violated, "Passwords must be hashed");
    }

    #[test]
    fn object_wrapper_and_string_line() {
        let raw = r#"{"violations":[{"line":"3","violating_code":"x","explanation":"y","rule_violated":"z"}]}"#;
        let Classification::Violations(found) = parse_findings(raw) else {
            panic!("expected violations");
        };
        assert_eq!(found[0].line_offset, Some(3));
    }

    #[test]
    fn missing_line_is_none() {
        let Classification::Violations(found) =
            parse_findings(r#"[{"violating_code":"x","explanation":"y","rule_violated":"z"}]"#)
        else {
            panic!("expected violations");
        };
        assert_eq!(found[0].line_offset, None);
    }

    #[test]
    fn junk_items_are_dropped() {
        let raw = r#"[42, {}, {"rule_violated":"R"}]"#;
        let Classification::Violations(found) = parse_findings(raw) else {
            panic!("expected violations");
        };
        assert_eq!(found.len(), 1);
    }

    #[rstest]
    #[case("")]
    #[case("I could not find anything wrong.")]
    #[case("{\"status\":\"ok\"}")]
    #[case("\"[]\"")]
    fn unparsable(#[case] raw: &str) {
        assert!(matches!(parse_findings(raw), Classification::Unparsable { .. }));
    }

    #[test]
    fn hints_object() {
        let raw = r#"{"globs":["**/auth/**"],"keywords":["bcrypt"],"extensions":["py","*.js","**/x/"]}"#;
        let hints = parse_hints(raw).expect("parse_hints should succeed");
        assert_eq!(hints.globs, vec!["**/auth/**"]);
        assert_eq!(hints.extensions, vec![".py", ".js"]);
        assert_eq!(hints.keywords, vec!["bcrypt"]);
    }

    #[test]
    fn refined_patterns_accept_strings_and_objects() {
        let raw = r#"{"refined_patterns":["http://", {"pattern":"verify=False","description":"no TLS check"}]}"#;
        let hints = parse_hints(raw).expect("parse_hints should succeed");
        assert_eq!(hints.keywords, vec!["http://", "verify=False"]);
    }

    #[test]
    fn bare_extension_array() {
        let hints = parse_hints(r#"[".js", ".jsx"]"#).expect("parse_hints should succeed");
        assert_eq!(hints.extensions, vec![".js", ".jsx"]);
        assert!(hints.globs.is_empty());
        assert!(hints.keywords.is_empty());
    }

    #[test]
    fn long_descriptions_are_not_keywords() {
        let long = "a".repeat(MAX_KEYWORD_CHARS + 1);
        assert!(parse_hints(&format!(r#"{{"keywords":["{long}"]}}"#)).is_none());
    }

    #[test]
    fn prose_is_no_hint() {
        assert!(parse_hints("no idea").is_none());
        assert!(parse_hints("{}").is_none());
    }
}
