//! Best-effort recovery of a JSON object from model output.
//!
//! Models are asked for a bare JSON object but often wrap it in prose or code
//! fences. The span from the first `{` to the last `}` is parsed; if that
//! fails, the whole text is parsed. Text containing two sibling objects yields
//! a span that is not valid JSON, so such replies come back as `None` unless
//! the whole text happens to parse.

use serde_json::Value;

/// Recover the JSON payload embedded in `text`, if any.
pub fn recover_json(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str(&text[start..=end])
        .or_else(|_| serde_json::from_str(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_object_from_prose() {
        let text = r#"Here is the answer: {"latex":"2+2","answer":"4","steps":["add"],"notes":""} Thanks"#;
        let parsed = recover_json(text).unwrap();
        assert_eq!(
            parsed,
            json!({"latex": "2+2", "answer": "4", "steps": ["add"], "notes": ""})
        );
        assert_eq!(parsed["answer"], "4");
    }

    #[test]
    fn test_pure_json() {
        let parsed = recover_json(r#"{"latex":"x^2"}"#).unwrap();
        assert_eq!(parsed["latex"], "x^2");
    }

    #[test]
    fn test_code_fenced_json() {
        let text = "```json\n{\"answer\": \"x = 3\", \"steps\": [\"divide by 2\"]}\n```";
        let parsed = recover_json(text).unwrap();
        assert_eq!(parsed["answer"], "x = 3");
    }

    #[test]
    fn test_nested_braces() {
        let text = r#"Result: {"latex":"\\frac{1}{2}","steps":{"1":"halve"}} done"#;
        let parsed = recover_json(text).unwrap();
        assert_eq!(parsed["latex"], "\\frac{1}{2}");
        assert_eq!(parsed["steps"]["1"], "halve");
    }

    #[test]
    fn test_no_braces_returns_none() {
        assert_eq!(recover_json("The answer is 4."), None);
        assert_eq!(recover_json("only an opening { brace"), None);
        assert_eq!(recover_json("only a closing } brace"), None);
    }

    #[test]
    fn test_empty_text_returns_none() {
        assert_eq!(recover_json(""), None);
    }

    #[test]
    fn test_reversed_braces_return_none() {
        assert_eq!(recover_json("} backwards {"), None);
    }

    #[test]
    fn test_unbalanced_braces_return_none() {
        assert_eq!(recover_json(r#"{"latex": "x^2", "answer": {"#), None);
        assert_eq!(recover_json(r#"prefix {"a": 1 suffix }"#), None);
    }

    #[test]
    fn test_sibling_objects_are_not_split() {
        // The span `{"a":1} and {"b":2}` is not valid JSON; the heuristic
        // deliberately does not try to pick one of the objects.
        assert_eq!(recover_json(r#"{"a":1} and {"b":2}"#), None);
    }

    #[test]
    fn test_falls_back_to_whole_text() {
        // Span parse fails (two objects), but the whole text is a JSON array.
        let parsed = recover_json(r#"[{"a":1},{"b":2}]"#).unwrap();
        assert_eq!(parsed, json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn test_recovery_is_idempotent() {
        let inputs = [
            r#"Sure! {"latex":"x^2","answer":"0","steps":["set x=0"],"notes":"none"} Hope that helps."#,
            r#"{"answer": {"value": 4, "unit": null}}"#,
            "```json\n{\"steps\": [\"a\", \"b\"]}\n```",
        ];
        for input in inputs {
            let first = recover_json(input).unwrap();
            let again = recover_json(&first.to_string()).unwrap();
            assert_eq!(first, again, "not idempotent for {input}");
        }
    }
}
