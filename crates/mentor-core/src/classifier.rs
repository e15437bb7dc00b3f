//! Chat message classification.
//!
//! A message is routed to the code reviewer when it carries code and
//! either asks for a review explicitly or carries enough code that a
//! review is the obvious intent.

use regex::Regex;
use std::sync::LazyLock;

/// Messages with more code than this are reviewed without being asked.
const IMPLICIT_REVIEW_MIN_CHARS: usize = 50;

const REVIEW_KEYWORDS: [&str; 3] = ["review", "check", "analyze"];

const CODE_PATTERNS: [&str; 8] = [
    r"(?s)```.*```",
    r"function\s+\w+\s*\(",
    r"const\s+\w+\s*=",
    r"class\s+\w+",
    r"import\s+.*from",
    r"export\s+(default|const|function)",
    r"<\w+.*>",
    r"def\s+\w+\s*\(",
];

/// Code detectors, one per entry of `CODE_PATTERNS`.
static CODE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CODE_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Invalid code pattern"))
        .collect()
});

/// Body of the first fenced block, language tag skipped.
static FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:\w+)?\n?(.*?)```").expect("Invalid fence regex"));

/// How a chat message should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Review `code` and answer with mentor feedback.
    CodeReview { code: String },
    /// Plain conversational answer.
    General,
}

/// Returns true if the text looks like it contains source code.
pub fn contains_code(text: &str) -> bool {
    CODE_REGEXES.iter().any(|re| re.is_match(text))
}

/// Pulls code out of a message.
///
/// The body of the first fenced block wins. Otherwise the whole message is
/// returned when it looks like code.
pub fn extract_code(text: &str) -> Option<String> {
    if let Some(body) = FENCE_REGEX.captures(text).and_then(|caps| caps.get(1)) {
        return Some(body.as_str().trim().to_string());
    }
    contains_code(text).then(|| text.to_string())
}

pub fn classify_message(message: &str) -> MessageKind {
    let Some(code) = extract_code(message) else {
        return MessageKind::General;
    };
    if code.is_empty() {
        return MessageKind::General;
    }

    let lower = message.to_lowercase();
    let asks_for_review = REVIEW_KEYWORDS.iter().any(|kw| lower.contains(kw));
    if asks_for_review || code.chars().count() > IMPLICIT_REVIEW_MIN_CHARS {
        MessageKind::CodeReview { code }
    } else {
        MessageKind::General
    }
}
