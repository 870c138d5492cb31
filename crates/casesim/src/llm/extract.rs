use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model output")]
    NoObject,
    #[error("model output contains an unterminated JSON object")]
    Unterminated,
    #[error("model output is not valid JSON: {0}")]
    Invalid(String),
}

/// Locate the first complete top-level `{...}` in free text.
///
/// Braces inside string literals (including escaped quotes) do not count toward nesting.
pub fn first_json_object(text: &str) -> Result<&str, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoObject)?;
    balanced_from(text, start).ok_or(ExtractionError::Unterminated)
}

fn balanced_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract and parse the first JSON object in `text`.
///
/// A balanced candidate that fails to parse (a brace in prose, say) does not end the search;
/// scanning resumes at the next `{`. The first failure is reported when nothing parses.
pub fn parse_first_object(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    let mut first_error = None;

    for (start, _) in text.match_indices('{') {
        let error = match balanced_from(text, start) {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => return Ok(map),
                Ok(_) => ExtractionError::NoObject,
                Err(err) => ExtractionError::Invalid(err.to_string()),
            },
            None => ExtractionError::Unterminated,
        };
        first_error.get_or_insert(error);
    }

    Err(first_error.unwrap_or(ExtractionError::NoObject))
}
