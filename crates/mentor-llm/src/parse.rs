//! Locating JSON inside free-form model replies.
//!
//! Models often wrap JSON in prose or markdown fences. The span from the
//! first opening bracket to the last closing bracket is taken as the
//! candidate document.

fn span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// The first `{` through the last `}`.
pub fn json_object_span(text: &str) -> Option<&str> {
    span(text, '{', '}')
}

/// The first `[` through the last `]`.
pub fn json_array_span(text: &str) -> Option<&str> {
    span(text, '[', ']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_inside_markdown() {
        let reply = "Here you go:\n```json\n{\"has_code\": true, \"code\": \"x\"}\n```";
        assert_eq!(json_object_span(reply), Some("{\"has_code\": true, \"code\": \"x\"}"));
    }

    #[test]
    fn test_array_span_is_greedy() {
        let reply = "Issues: [{\"a\": [1]}, {\"b\": 2}] done";
        assert_eq!(json_array_span(reply), Some("[{\"a\": [1]}, {\"b\": 2}]"));
    }

    #[test]
    fn test_missing_or_reversed_brackets() {
        assert_eq!(json_object_span("no json"), None);
        assert_eq!(json_array_span("] backwards ["), None);
    }
}
